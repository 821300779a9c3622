use crate::enums::MeetingSource;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pitcher profile: someone seeking a paid conversation to support a cause.
///
/// `credit_balance` is only ever mutated by the ledger updater, which keeps it
/// equal to the sum of that pitcher's fund history rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pitcher {
    pub pitcher_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub pitch: String,
    /// The donation amount a listener pays per meeting.
    pub donation: Decimal,
    pub credit_balance: Decimal,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A listener profile: someone willing to pay for a conversation, with the
/// proceeds routed to a cause. Same lifecycle shape as a pitcher, no balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Listener {
    pub listener_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub intro: String,
    pub donation: Decimal,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// One append-only audit row per balance-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FundHistoryRecord {
    pub history_id: Uuid,
    pub pitcher_id: Uuid,
    pub amount: Decimal,
    pub event_type: String,
    /// The payment processor's capture/session reference. Unique, so a single
    /// processor event can never be credited twice.
    pub payment_ref_id: String,
    pub recorded_at: DateTime<Utc>,
}

/// An arranged meeting between a listener and a pitcher.
///
/// The pitcher's name and email are stored denormalized: a meeting request can
/// be sent by a pitcher who has not registered a profile yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meeting {
    pub meeting_id: Uuid,
    pub source: String,
    pub listener_id: Uuid,
    pub pitcher_id: Option<Uuid>,
    pub pitcher_name: String,
    pub pitcher_email: String,
    /// Free-form availability / introduction text from the requester.
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Signup payload for a pitcher profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPitcher {
    pub full_name: String,
    pub email: String,
    pub pitch: String,
    pub donation: Decimal,
}

impl NewPitcher {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name_and_email("pitcher", &self.full_name, &self.email)?;
        if self.pitch.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "pitcher".to_string(),
                "pitch must not be empty".to_string(),
            ));
        }
        validate_donation("pitcher", self.donation)
    }
}

/// Signup payload for a listener profile.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListener {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub intro: String,
    pub donation: Decimal,
}

impl NewListener {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name_and_email("listener", &self.full_name, &self.email)?;
        validate_donation("listener", self.donation)
    }
}

/// Partial profile update. `about` maps to the pitch text for pitchers and
/// the intro text for listeners.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub about: Option<String>,
    pub donation: Option<Decimal>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(CoreError::InvalidInput(
                    "profile update".to_string(),
                    "full_name must not be empty".to_string(),
                ));
            }
        }
        if let Some(donation) = self.donation {
            validate_donation("profile update", donation)?;
        }
        Ok(())
    }
}

/// Payload for arranging a meeting from a public profile page.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeeting {
    pub source: MeetingSource,
    pub listener_id: Uuid,
    pub pitcher_id: Option<Uuid>,
    pub pitcher_name: String,
    pub pitcher_email: String,
    pub message: String,
}

impl NewMeeting {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name_and_email("meeting", &self.pitcher_name, &self.pitcher_email)?;
        if self.message.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "meeting".to_string(),
                "message must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_name_and_email(context: &str, full_name: &str, email: &str) -> Result<(), CoreError> {
    if full_name.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            context.to_string(),
            "full_name must not be empty".to_string(),
        ));
    }
    // Deliverability is the mail provider's problem; this only rejects values
    // that cannot possibly be an address.
    if !email.contains('@') || email.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            context.to_string(),
            format!("'{}' is not a valid email address", email),
        ));
    }
    Ok(())
}

fn validate_donation(context: &str, donation: Decimal) -> Result<(), CoreError> {
    if donation <= Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            context.to_string(),
            format!("donation must be a positive amount, got {}", donation),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_pitcher() -> NewPitcher {
        NewPitcher {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            pitch: "Clean water for rural schools.".to_string(),
            donation: dec!(25),
        }
    }

    #[test]
    fn valid_pitcher_passes() {
        assert!(new_pitcher().validate().is_ok());
    }

    #[test]
    fn pitcher_with_zero_donation_is_rejected() {
        let mut pitcher = new_pitcher();
        pitcher.donation = Decimal::ZERO;
        assert!(pitcher.validate().is_err());
    }

    #[test]
    fn pitcher_with_blank_pitch_is_rejected() {
        let mut pitcher = new_pitcher();
        pitcher.pitch = "   ".to_string();
        assert!(pitcher.validate().is_err());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut pitcher = new_pitcher();
        pitcher.email = "not-an-address".to_string();
        assert!(pitcher.validate().is_err());
    }

    #[test]
    fn update_with_negative_donation_is_rejected() {
        let update = ProfileUpdate {
            donation: Some(dec!(-5)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn empty_update_is_allowed() {
        assert!(ProfileUpdate::default().validate().is_ok());
    }

    #[test]
    fn meeting_requires_a_message() {
        let meeting = NewMeeting {
            source: MeetingSource::ListenerPage,
            listener_id: Uuid::new_v4(),
            pitcher_id: None,
            pitcher_name: "Jane Doe".to_string(),
            pitcher_email: "jane@example.com".to_string(),
            message: "".to_string(),
        };
        assert!(meeting.validate().is_err());
    }
}
