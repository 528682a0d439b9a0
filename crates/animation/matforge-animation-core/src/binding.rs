//! Parameter bindings: which track animates which (node, parameter) address.
//!
//! The node key is generic so the owning graph decides what identifies a node;
//! the material graph uses stable node handles, so deleting or reordering nodes
//! never requires renumbering bindings.

use matforge_params_core::ParameterType;

use crate::erased::{AnimationBase, KeyframeTrack};
use crate::error::AnimationError;

/// One animated parameter and the track that owns its keys.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimTrack<K> {
    pub node: K,
    pub parameter: u32,
    pub value_type: ParameterType,
    pub track: KeyframeTrack,
}

impl<K: Copy + Eq> AnimTrack<K> {
    pub fn new(node: K, parameter: u32, value_type: ParameterType) -> Result<Self, AnimationError> {
        Ok(AnimTrack {
            node,
            parameter,
            value_type,
            track: KeyframeTrack::for_parameter(value_type)?,
        })
    }

    #[inline]
    pub fn targets(&self, node: K, parameter: u32) -> bool {
        self.node == node && self.parameter == parameter
    }
}

/// All bindings of one graph. Lookups scan linearly; graphs carry tens of
/// bindings at most.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedParameterSet<K> {
    tracks: Vec<AnimTrack<K>>,
}

impl<K> Default for AnimatedParameterSet<K> {
    fn default() -> Self {
        AnimatedParameterSet { tracks: Vec::new() }
    }
}

impl<K: Copy + Eq> AnimatedParameterSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimTrack<K>> {
        self.tracks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AnimTrack<K>> {
        self.tracks.iter_mut()
    }

    fn position(&self, node: K, parameter: u32) -> Option<usize> {
        self.tracks.iter().position(|t| t.targets(node, parameter))
    }

    /// Bind `(node, parameter)` to an empty track matching `value_type`.
    ///
    /// An existing binding with the same type is kept as is; one with a
    /// different type is replaced by a fresh track.
    pub fn bind(
        &mut self,
        node: K,
        parameter: u32,
        value_type: ParameterType,
    ) -> Result<&mut AnimTrack<K>, AnimationError> {
        let index = match self.position(node, parameter) {
            Some(i) if self.tracks[i].value_type == value_type => i,
            Some(i) => {
                log::debug!(
                    "parameter {} rebound from {:?} to {:?}; keys dropped",
                    parameter,
                    self.tracks[i].value_type,
                    value_type
                );
                self.tracks[i] = AnimTrack::new(node, parameter, value_type)?;
                i
            }
            None => {
                self.tracks.push(AnimTrack::new(node, parameter, value_type)?);
                self.tracks.len() - 1
            }
        };
        Ok(&mut self.tracks[index])
    }

    /// Insert a fully built binding, replacing any binding of the same address.
    pub fn insert(&mut self, binding: AnimTrack<K>) {
        match self.position(binding.node, binding.parameter) {
            Some(i) => self.tracks[i] = binding,
            None => self.tracks.push(binding),
        }
    }

    pub fn unbind(&mut self, node: K, parameter: u32) -> Option<AnimTrack<K>> {
        let i = self.position(node, parameter)?;
        Some(self.tracks.remove(i))
    }

    pub fn get(&self, node: K, parameter: u32) -> Option<&AnimTrack<K>> {
        self.tracks.iter().find(|t| t.targets(node, parameter))
    }

    pub fn get_mut(&mut self, node: K, parameter: u32) -> Option<&mut AnimTrack<K>> {
        self.tracks.iter_mut().find(|t| t.targets(node, parameter))
    }

    pub fn for_node(&self, node: K) -> impl Iterator<Item = &AnimTrack<K>> {
        self.tracks.iter().filter(move |t| t.node == node)
    }

    /// Drop every binding of `node`; returns how many were removed.
    pub fn remove_node(&mut self, node: K) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.node != node);
        before - self.tracks.len()
    }

    pub fn retain(&mut self, f: impl FnMut(&AnimTrack<K>) -> bool) {
        self.tracks.retain(f)
    }

    /// Union of every track's keyed range.
    pub fn frame_range(&self) -> Option<(i32, i32)> {
        self.tracks
            .iter()
            .filter_map(|t| t.track.frame_range())
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erased::AnimationBase;
    use crate::value::{AnimValue, TrackKind};

    #[test]
    fn bind_allocates_matching_tracks() {
        let mut set = AnimatedParameterSet::<u32>::new();
        let b = set.bind(3, 1, ParameterType::Color4).unwrap();
        assert_eq!(b.track.kind(), TrackKind::Float4);
        b.track
            .set_value_at(0, &AnimValue::Float4([1.0; 4]))
            .unwrap();

        // Same type keeps the keys, a new type resets them.
        assert_eq!(set.bind(3, 1, ParameterType::Float4).unwrap().track.len(), 0);
        set.get_mut(3, 1)
            .unwrap()
            .track
            .set_value_at(2, &AnimValue::Float4([0.0; 4]))
            .unwrap();
        assert_eq!(set.bind(3, 1, ParameterType::Float4).unwrap().track.len(), 1);
        assert_eq!(set.len(), 1);

        assert!(matches!(
            set.bind(3, 2, ParameterType::FilenameRead),
            Err(AnimationError::NotAnimatable(_))
        ));
    }

    #[test]
    fn remove_node_drops_only_its_bindings() {
        let mut set = AnimatedParameterSet::<u32>::new();
        set.bind(1, 0, ParameterType::Float).unwrap();
        set.bind(1, 2, ParameterType::Int).unwrap();
        set.bind(2, 0, ParameterType::Float).unwrap();
        assert_eq!(set.remove_node(1), 2);
        assert!(set.get(2, 0).is_some());
        assert!(set.unbind(2, 0).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn equality_follows_track_content() {
        let mut a = AnimatedParameterSet::<u32>::new();
        let mut b = AnimatedParameterSet::<u32>::new();
        for set in [&mut a, &mut b] {
            set.bind(0, 0, ParameterType::Float).unwrap();
        }
        assert_eq!(a, b);
        a.get_mut(0, 0)
            .unwrap()
            .track
            .set_value_at(5, &AnimValue::Float(1.0))
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(a.frame_range(), Some((5, 5)));
    }
}
