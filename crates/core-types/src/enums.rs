use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Pitcher,
    Listener,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Pitcher => "pitcher",
            UserRole::Listener => "listener",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of an arranged meeting. Stored as text in the `meetings` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    Pending,
    Confirmed,
    Completed,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Pending => "pending",
            MeetingStatus::Confirmed => "confirmed",
            MeetingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which public profile page a meeting request originated from. The
/// notification templates swap sender and recipient based on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingSource {
    PitcherPage,
    ListenerPage,
}

impl MeetingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingSource::PitcherPage => "pitcher_page",
            MeetingSource::ListenerPage => "listener_page",
        }
    }
}

impl fmt::Display for MeetingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of balance-affecting event recorded in the fund history ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundEventType {
    AddFund,
    Escrow,
    Adjustment,
}

impl FundEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FundEventType::AddFund => "add_fund",
            FundEventType::Escrow => "escrow",
            FundEventType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for FundEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fund_event_type_serializes_as_snake_case() {
        let json = serde_json::to_string(&FundEventType::AddFund).unwrap();
        assert_eq!(json, "\"add_fund\"");

        let parsed: FundEventType = serde_json::from_str("\"escrow\"").unwrap();
        assert_eq!(parsed, FundEventType::Escrow);
    }

    #[test]
    fn meeting_source_round_trips() {
        let parsed: MeetingSource = serde_json::from_str("\"listener_page\"").unwrap();
        assert_eq!(parsed, MeetingSource::ListenerPage);
        assert_eq!(parsed.as_str(), "listener_page");
    }

    #[test]
    fn unknown_meeting_status_is_rejected() {
        let parsed = serde_json::from_str::<MeetingStatus>("\"cancelled\"");
        assert!(parsed.is_err());
    }
}
