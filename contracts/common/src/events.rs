//! Engine Events
//!
//! Events are emitted during operation execution and can be indexed
//! off-engine for building UIs, analytics, and liquidation bots. The log is
//! buffered per call and only survives if the whole operation commits.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, AssetId};
use crate::Vec;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    CollateralDeposited = 0x01,
    CollateralRedeemed = 0x02,
}

/// Main event enum containing all engine events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum EngineEvent {
    /// Emitted when collateral is deposited into custody
    CollateralDeposited {
        account: Address,
        asset: AssetId,
        amount: u128,
    },

    /// Emitted when collateral leaves custody. `from` and `to` differ when
    /// a liquidation seizes collateral on the owner's behalf.
    CollateralRedeemed {
        from: Address,
        to: Address,
        asset: AssetId,
        amount: u128,
    },
}

impl EngineEvent {
    /// Returns the event's type tag
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollateralDeposited { .. } => EventType::CollateralDeposited,
            Self::CollateralRedeemed { .. } => EventType::CollateralRedeemed,
        }
    }

    /// Serialize event to bytes for off-engine indexing
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution.
///
/// Supports truncation back to a watermark so a failed operation can discard
/// everything it buffered.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<EngineEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Number of events in the log; doubles as the rollback watermark
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if any events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard every event emitted after `watermark`
    pub fn truncate(&mut self, watermark: usize) {
        self.events.truncate(watermark);
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = EngineEvent::CollateralDeposited {
            account: [1u8; 32],
            asset: [2u8; 32],
            amount: 10_000_000_000_000_000_000,
        };

        assert_eq!(event.event_type(), EventType::CollateralDeposited);
    }

    #[test]
    fn test_event_serialization() {
        let event = EngineEvent::CollateralRedeemed {
            from: [1u8; 32],
            to: [2u8; 32],
            asset: [3u8; 32],
            amount: 2_750_000_000_000_000_000,
        };

        let bytes = event.to_bytes();
        let restored = EngineEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_log_truncate() {
        let mut log = EventLog::new();

        log.emit(EngineEvent::CollateralDeposited {
            account: [1u8; 32],
            asset: [2u8; 32],
            amount: 1,
        });
        let watermark = log.len();
        log.emit(EngineEvent::CollateralRedeemed {
            from: [1u8; 32],
            to: [1u8; 32],
            asset: [2u8; 32],
            amount: 1,
        });

        assert_eq!(log.len(), 2);
        log.truncate(watermark);
        assert_eq!(log.len(), 1);
        assert_eq!(log.filter_by_type(EventType::CollateralRedeemed).len(), 0);
    }
}
