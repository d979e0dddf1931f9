// ============================================================================
// spark-view - Type Definitions
// Handles shared between the engine and the presentation tree host
// ============================================================================

use std::fmt;

// =============================================================================
// HOST HANDLES
// =============================================================================
//
// The engine never owns host nodes. It holds opaque handles that the
// PresentationTree implementation maps back onto its own node storage.
// =============================================================================

/// Opaque handle to a live element in the host's presentation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(pub u64);

/// Opaque handle to a live text node in the host's presentation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRef(pub u64);

/// Handle to a listener or value observer registered with the host, used to
/// detach it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

impl fmt::Display for TextRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text#{}", self.0)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

// =============================================================================
// NODE ID
// =============================================================================

/// Identity of a node snapshot inside the engine's arena.
///
/// The generation ties the id to one mount: ids handed out before an
/// `unmount` no longer resolve after the next `mount`, which is how stale
/// dependency entries are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Create an id from its arena slot and mount generation.
    pub fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }

    /// Arena slot
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Mount generation
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}@{}", self.index, self.generation)
    }
}

// =============================================================================
// EVENT
// =============================================================================

/// An event fired by the host on a live element.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name without the `@` prefix (`click`, `input`, ...)
    pub name: String,
    /// Element the listener was registered on
    pub target: ElementRef,
}

impl Event {
    pub fn new(name: impl Into<String>, target: ElementRef) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_round_trips_slot_and_generation() {
        let id = NodeId::new(7, 3);
        assert_eq!(id.index(), 7);
        assert_eq!(id.generation(), 3);
        assert_ne!(id, NodeId::new(7, 4));
    }

    #[test]
    fn handles_display() {
        assert_eq!(ElementRef(4).to_string(), "element#4");
        assert_eq!(TextRef(9).to_string(), "text#9");
        assert_eq!(ListenerId(5).to_string(), "listener#5");
        assert_eq!(NodeId::new(2, 1).to_string(), "node#2@1");
    }
}
