//! Typed keyframe storage.
//!
//! `Animation<T>` keeps two parallel vectors: strictly ascending frame numbers
//! and one value per frame. Every mutation preserves both properties, so
//! sampling can binary-search the frames without a validation pass.

use crate::error::AnimationError;
use crate::keyable::Keyable;

/// Keyframes surrounding a query frame.
///
/// Outside the keyed range both ends point at the nearest endpoint and `ratio`
/// is 0; on an exact key both ends point at that key.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bracket {
    pub previous_index: usize,
    pub previous_frame: i32,
    pub next_index: usize,
    pub next_frame: i32,
    pub ratio: f32,
}

impl Bracket {
    fn at(index: usize, frame: i32) -> Self {
        Bracket {
            previous_index: index,
            previous_frame: frame,
            next_index: index,
            next_frame: frame,
            ratio: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Animation<T: Keyable> {
    frames: Vec<i32>,
    values: Vec<T>,
}

impl<T: Keyable> Default for Animation<T> {
    fn default() -> Self {
        Animation {
            frames: Vec::new(),
            values: Vec::new(),
        }
    }
}

/// Position of `frame` between two keys as 0..=1. Widened so keys anywhere in
/// the `i32` range do not overflow.
fn ratio_between(previous_frame: i32, next_frame: i32, frame: i32) -> f32 {
    let span = i64::from(next_frame) - i64::from(previous_frame);
    if span == 0 {
        return 0.0;
    }
    ((i64::from(frame) - i64::from(previous_frame)) as f64 / span as f64) as f32
}

impl<T: Keyable> Animation<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a track from `(frame, value)` pairs in any order. Later duplicates
    /// overwrite earlier ones.
    pub fn from_keys(keys: impl IntoIterator<Item = (i32, T)>) -> Self {
        let mut track = Self::new();
        for (frame, value) in keys {
            track.set_value_at(frame, value);
        }
        track
    }

    /// Rebuild a track from persisted frames and the raw bytes of its values.
    pub fn from_raw_parts(frames: Vec<i32>, bytes: &[u8]) -> Result<Self, AnimationError> {
        let size = std::mem::size_of::<T>();
        if bytes.len() != frames.len() * size {
            return Err(AnimationError::ByteLength {
                kind: T::KIND,
                expected: frames.len() * size,
                actual: bytes.len(),
            });
        }
        if let Some(i) = frames.windows(2).position(|w| w[0] >= w[1]) {
            return Err(AnimationError::UnsortedFrames {
                index: i + 1,
                frame: frames[i + 1],
            });
        }
        Ok(Animation {
            values: bytemuck::pod_collect_to_vec(bytes),
            frames,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn keys(&self) -> impl Iterator<Item = (i32, &T)> + '_ {
        self.frames.iter().copied().zip(self.values.iter())
    }

    /// First and last keyed frame.
    pub fn frame_range(&self) -> Option<(i32, i32)> {
        Some((*self.frames.first()?, *self.frames.last()?))
    }

    /// Resize to `count` keys. New keys are zeroed and placed one frame apart
    /// after the current last key.
    ///
    /// Fails without changing the track when the new frames would run past
    /// `i32::MAX`.
    pub fn allocate(&mut self, count: usize) -> Result<(), AnimationError> {
        if count <= self.len() {
            self.frames.truncate(count);
            self.values.truncate(count);
            return Ok(());
        }
        let first = match self.frames.last() {
            Some(last) => last.checked_add(1),
            None => Some(0),
        };
        let extra = count - self.len();
        let overflow = AnimationError::FrameOverflow { count };
        let first = first.ok_or(overflow.clone())?;
        i32::try_from(extra - 1)
            .ok()
            .and_then(|span| first.checked_add(span))
            .ok_or(overflow)?;
        self.frames.extend((0..extra).map(|i| first + i as i32));
        self.values.resize(count, T::zeroed());
        Ok(())
    }

    /// Bracket `frame` between its neighbouring keys. `None` for an empty track.
    pub fn locate(&self, frame: i32) -> Option<Bracket> {
        let last = self.frames.len().checked_sub(1)?;
        let next = self.frames.partition_point(|f| *f < frame);
        if next > last {
            return Some(Bracket::at(last, self.frames[last]));
        }
        if next == 0 || self.frames[next] == frame {
            return Some(Bracket::at(next, self.frames[next]));
        }
        let previous = next - 1;
        let (previous_frame, next_frame) = (self.frames[previous], self.frames[next]);
        Some(Bracket {
            previous_index: previous,
            previous_frame,
            next_index: next,
            next_frame,
            ratio: ratio_between(previous_frame, next_frame, frame),
        })
    }

    /// Interpolated value at `frame`, clamped to the keyed range.
    pub fn value_at(&self, frame: i32) -> Option<T> {
        let b = self.locate(frame)?;
        let previous = &self.values[b.previous_index];
        if b.previous_index == b.next_index {
            return Some(*previous);
        }
        Some(previous.lerp(&self.values[b.next_index], b.ratio))
    }

    /// Key `value` at `frame`: overwrite the key on that frame, or insert a new
    /// one in sorted position. Returns the key's index.
    pub fn set_value_at(&mut self, frame: i32, value: T) -> usize {
        match self.frames.binary_search(&frame) {
            Ok(i) => {
                self.values[i] = value;
                i
            }
            Err(i) => {
                self.frames.insert(i, frame);
                self.values.insert(i, value);
                i
            }
        }
    }

    pub fn remove_key(&mut self, index: usize) -> Result<(i32, T), AnimationError> {
        if index >= self.len() {
            return Err(AnimationError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok((self.frames.remove(index), self.values.remove(index)))
    }

    fn value(&self, index: usize) -> Result<&T, AnimationError> {
        self.values.get(index).ok_or(AnimationError::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    pub fn component_as_float(&self, index: usize, component: usize) -> Result<f32, AnimationError> {
        self.value(index)?
            .component(component)
            .ok_or(AnimationError::ComponentOutOfRange {
                kind: T::KIND,
                component,
                count: T::COMPONENTS,
            })
    }

    pub fn set_component_from_float(
        &mut self,
        index: usize,
        component: usize,
        value: f32,
    ) -> Result<(), AnimationError> {
        let len = self.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(AnimationError::IndexOutOfRange { index, len })?;
        if !slot.set_component(component, value) {
            return Err(AnimationError::ComponentOutOfRange {
                kind: T::KIND,
                component,
                count: T::COMPONENTS,
            });
        }
        Ok(())
    }

    /// Size of all values in bytes.
    pub fn byte_length(&self) -> usize {
        std::mem::size_of_val(self.values.as_slice())
    }

    pub fn raw_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    pub fn copy_from(&mut self, other: &Animation<T>) {
        self.frames.clone_from(&other.frames);
        self.values.clone_from(&other.values);
    }
}

/// Byte-exact: `-0.0` and `0.0` differ, identical NaN payloads are equal.
impl<T: Keyable> PartialEq for Animation<T> {
    fn eq(&self, other: &Self) -> bool {
        self.frames == other.frames && self.raw_bytes() == other.raw_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Animation<f32> {
        Animation::from_keys([(20, 10.0), (10, 0.0)])
    }

    #[test]
    fn locate_clamps_outside_the_keyed_range() {
        let t = ramp();
        assert_eq!(t.locate(5), Some(Bracket::at(0, 10)));
        assert_eq!(t.locate(25), Some(Bracket::at(1, 20)));
        assert_eq!(t.locate(20), Some(Bracket::at(1, 20)));
        let mid = t.locate(12).unwrap();
        assert_eq!((mid.previous_index, mid.next_index), (0, 1));
        assert!((mid.ratio - 0.2).abs() < 1e-6);
        assert_eq!(Animation::<f32>::new().locate(3), None);
    }

    #[test]
    fn insertion_keeps_frames_sorted() {
        let mut t = ramp();
        assert_eq!(t.set_value_at(15, 3.0), 1);
        assert_eq!(t.set_value_at(-4, 1.0), 0);
        assert_eq!(t.set_value_at(15, 4.0), 2);
        assert_eq!(t.frames(), &[-4, 10, 15, 20]);
        assert_eq!(t.values(), &[1.0, 0.0, 4.0, 10.0]);
    }

    #[test]
    fn allocate_extends_after_the_last_key() {
        let mut t = ramp();
        t.allocate(4).unwrap();
        assert_eq!(t.frames(), &[10, 20, 21, 22]);
        assert_eq!(t.values()[3], 0.0);
        t.allocate(1).unwrap();
        assert_eq!(t.frames(), &[10]);
        let mut empty = Animation::<[f32; 2]>::new();
        empty.allocate(2).unwrap();
        assert_eq!(empty.frames(), &[0, 1]);
        assert_eq!(empty.byte_length(), 16);
    }

    #[test]
    fn allocate_refuses_frames_past_the_end_of_time() {
        let mut t = Animation::<f32>::new();
        t.set_value_at(i32::MAX - 1, 1.0);
        assert_eq!(t.allocate(3), Err(AnimationError::FrameOverflow { count: 3 }));
        assert_eq!(t.frames(), &[i32::MAX - 1]);
        t.allocate(2).unwrap();
        assert_eq!(t.frames(), &[i32::MAX - 1, i32::MAX]);
        assert_eq!(t.allocate(3), Err(AnimationError::FrameOverflow { count: 3 }));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn raw_parts_are_validated() {
        let t = ramp();
        let rebuilt = Animation::<f32>::from_raw_parts(t.frames().to_vec(), t.raw_bytes()).unwrap();
        assert_eq!(rebuilt, t);
        assert!(matches!(
            Animation::<f32>::from_raw_parts(vec![3, 3], &[0; 8]),
            Err(AnimationError::UnsortedFrames { index: 1, frame: 3 })
        ));
        assert!(matches!(
            Animation::<f32>::from_raw_parts(vec![1], &[0; 3]),
            Err(AnimationError::ByteLength { expected: 4, actual: 3, .. })
        ));
    }

    #[test]
    fn equality_is_byte_exact() {
        let a = Animation::from_keys([(0, 0.0f32)]);
        let b = Animation::from_keys([(0, -0.0f32)]);
        assert_ne!(a, b);
    }

    #[test]
    fn component_access_reports_bounds() {
        let mut t = Animation::from_keys([(0, [1.0f32, 2.0])]);
        t.set_component_from_float(0, 1, 5.0).unwrap();
        assert_eq!(t.component_as_float(0, 1), Ok(5.0));
        assert!(matches!(
            t.component_as_float(0, 2),
            Err(AnimationError::ComponentOutOfRange { component: 2, count: 2, .. })
        ));
        assert!(matches!(
            t.set_component_from_float(1, 0, 0.0),
            Err(AnimationError::IndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
