//! The three transactional email templates: signup welcome, payment
//! confirmation, and meeting arrangement.
//!
//! Each renderer returns `(subject, html_body)`. All user-supplied values are
//! HTML-escaped before interpolation.

use core_types::{MeetingSource, UserRole};
use rust_decimal::Decimal;

/// Variables for the meeting-arrangement email sent to both parties.
///
/// `source` decides the framing: a request from a pitcher's public page means
/// a listener wants to hear the pitch; a request from a listener's page means
/// a pitcher wants to give one.
#[derive(Debug, Clone)]
pub struct MeetingNotification {
    pub source: MeetingSource,
    pub pitcher_name: String,
    pub pitcher_email: String,
    pub listener_name: String,
    pub listener_email: String,
    /// Free-form availability text from the requester.
    pub message: String,
    /// The donation that goes to the cause after the meeting.
    pub donation: Decimal,
}

/// A helper function to escape characters that have special meaning in HTML.
pub fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn format_usd(amount: Decimal) -> String {
    let mut value = amount;
    value.rescale(2);
    format!("{} USD", value)
}

fn wrap_page(title: &str, inner: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8" /><title>{title}</title></head>
<body style="margin: 0; padding: 0; background-color: #f5f5f5;">
  <div style="font-family: Arial, sans-serif; background-color: #ffffff; padding: 30px; border-radius: 8px; max-width: 600px; margin: 5px auto; border: 1px solid #e0e0e0;">
{inner}
    <p style="font-size: 16px; color: #333333;">Best regards,</p>
    <p style="color: #888888; font-size: 14px;">&ndash; The DonaTalk Team</p>
    <hr style="margin-top: 30px; border: none; border-top: 1px solid #e0e0e0;">
    <p style="text-align: center; font-size: 12px; color: #aaaaaa;">&copy; 2025 DonaTalk. All rights reserved.</p>
  </div>
</body>
</html>"#
    )
}

/// Welcome email sent right after a profile is created.
pub fn signup_welcome(role: UserRole, full_name: &str, base_url: &str) -> (String, String) {
    let name = html_escape(full_name);

    let (excitement, next_step) = match role {
        UserRole::Pitcher => (
            "We are excited to support you in sharing your story.",
            format!(
                "Please make sure to add funds to your account at <a href=\"{base_url}\" style=\"color: #2C3E50;\">{base_url}</a>. Then, your page is ready to share!"
            ),
        ),
        UserRole::Listener => (
            "We are excited to support you in discovering a new story.",
            format!(
                "You can update your information at <a href=\"{base_url}\" style=\"color: #2C3E50;\">{base_url}</a>."
            ),
        ),
    };

    let subject = format!("Welcome to DonaTalk, {}!", full_name);
    let inner = format!(
        r#"    <h2 style="color: #2C3E50; text-align: center; margin-bottom: 20px;">Welcome to DonaTalk</h2>
    <p style="font-size: 16px; color: #333333;">Dear <strong>{name}</strong>,</p>
    <p style="font-size: 16px; color: #333333;">Thank you for joining DonaTalk as a {role}. {excitement}</p>
    <p style="font-size: 16px; color: #333333;">{next_step}</p>
"#
    );

    (subject, wrap_page("Welcome to DonaTalk", &inner))
}

/// Confirmation email sent to a pitcher after a payment was captured and
/// their balance credited.
pub fn payment_confirmation(
    pitcher_name: &str,
    amount: Decimal,
    base_url: &str,
) -> (String, String) {
    let name = html_escape(pitcher_name);
    let amount = format_usd(amount);

    let subject = format!("Your DonaTalk balance was topped up with {}", amount);
    let inner = format!(
        r#"    <h2 style="color: #2C3E50; text-align: center; margin-bottom: 20px;">Payment Confirmed</h2>
    <p style="font-size: 16px; color: #333333;">Dear <strong>{name}</strong>,</p>
    <p style="font-size: 16px; color: #333333;">We received your payment of <strong>{amount}</strong> and added it to your DonaTalk balance.</p>
    <p style="font-size: 16px; color: #333333;">You can review your balance and fund history at <a href="{base_url}" style="color: #2C3E50;">{base_url}</a>.</p>
"#
    );

    (subject, wrap_page("DonaTalk Payment Confirmation", &inner))
}

/// Meeting-arrangement email addressed to both the pitcher and the listener.
pub fn meeting_notification(
    notification: &MeetingNotification,
    meeting_link: &str,
    support_address: &str,
) -> (String, String) {
    // The "interested party" is whoever initiated from the other's page.
    let (subject, counterpart_role, dear_name, interested_name, interested_email, activity) =
        match notification.source {
            MeetingSource::PitcherPage => (
                format!("{} wants to hear your pitch! 🚀", notification.listener_name),
                "Listener",
                &notification.pitcher_name,
                &notification.listener_name,
                &notification.listener_email,
                "hearing your pitch",
            ),
            MeetingSource::ListenerPage => (
                format!("{} wants to give you a pitch! 🚀", notification.pitcher_name),
                "Pitcher",
                &notification.listener_name,
                &notification.pitcher_name,
                &notification.pitcher_email,
                "giving you a pitch",
            ),
        };

    let dear_name = html_escape(dear_name);
    let interested_name = html_escape(interested_name);
    let interested_email = html_escape(interested_email);
    let message = html_escape(&notification.message);
    let donation = format_usd(notification.donation);

    let inner = format!(
        r#"    <h2 style="color: #2C3E50; text-align: center; margin-bottom: 20px;">New {counterpart_role} Interest on DonaTalk</h2>
    <p style="font-size: 16px; color: #333333;">Dear <strong>{dear_name}</strong>,</p>
    <p style="font-size: 16px; color: #333333;">
      We&rsquo;re happy to let you know that <strong style="color: #2C3E50;">{interested_name}</strong>
      (<a href="mailto:{interested_email}" style="color: #2C3E50;">{interested_email}</a>) is interested in {activity}.
    </p>
    <p style="font-size: 16px; color: #333333;">Here&rsquo;s the availability information:</p>
    <blockquote style="background-color:#f9f9f9; padding: 15px; font-size: 16px; border-left: 5px solid #2C3E50; border-radius: 6px; color: #2C3E50; white-space: pre-wrap;">{message}</blockquote>
    <p style="font-size: 16px; color: #333333;"><strong>Next steps:</strong></p>
    <ul style="font-size: 16px; line-height: 1.6; color: #333333;">
      <li>Reply to this email to coordinate the meeting time. Include
        <strong>{support_address}</strong> in your response and calendar invite to confirm the meeting progress.
      </li>
      <li>Use this link for the meeting:<br/>
        <a href="{meeting_link}" style="color: #2C3E50; font-weight: bold;">{meeting_link}</a>
      </li>
      <li>After the meeting, <strong>{donation}</strong> will be sent to a non-profit organization.</li>
    </ul>
    <p style="font-size: 16px; color: #333333;">
      Thank you for using DonaTalk. We look forward to supporting your successful conversation.
    </p>
"#
    );

    (
        subject,
        wrap_page("DonaTalk - New Meeting Interest", &inner),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn notification(source: MeetingSource) -> MeetingNotification {
        MeetingNotification {
            source,
            pitcher_name: "Jane Doe".to_string(),
            pitcher_email: "jane@example.com".to_string(),
            listener_name: "John Smith".to_string(),
            listener_email: "john@example.com".to_string(),
            message: "Weekdays after 5pm CET".to_string(),
            donation: dec!(25),
        }
    }

    #[test]
    fn pitcher_page_request_addresses_the_pitcher() {
        let (subject, html) = meeting_notification(
            &notification(MeetingSource::PitcherPage),
            "https://zoom.example/j/1",
            "support@donatalk.com",
        );
        assert_eq!(subject, "John Smith wants to hear your pitch! 🚀");
        assert!(html.contains("Dear <strong>Jane Doe</strong>"));
        assert!(html.contains("john@example.com"));
        assert!(html.contains("Weekdays after 5pm CET"));
        assert!(html.contains("25.00 USD"));
    }

    #[test]
    fn listener_page_request_addresses_the_listener() {
        let (subject, html) = meeting_notification(
            &notification(MeetingSource::ListenerPage),
            "https://zoom.example/j/1",
            "support@donatalk.com",
        );
        assert_eq!(subject, "Jane Doe wants to give you a pitch! 🚀");
        assert!(html.contains("Dear <strong>John Smith</strong>"));
        assert!(html.contains("giving you a pitch"));
    }

    #[test]
    fn message_html_is_escaped() {
        let mut n = notification(MeetingSource::PitcherPage);
        n.message = "<script>alert(1)</script>".to_string();
        let (_, html) = meeting_notification(&n, "https://zoom.example/j/1", "s@d.com");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn signup_copy_differs_by_role() {
        let (subject, pitcher_html) =
            signup_welcome(UserRole::Pitcher, "Jane Doe", "https://app.donatalk.test");
        assert_eq!(subject, "Welcome to DonaTalk, Jane Doe!");
        assert!(pitcher_html.contains("add funds"));

        let (_, listener_html) =
            signup_welcome(UserRole::Listener, "John Smith", "https://app.donatalk.test");
        assert!(listener_html.contains("update your information"));
    }

    #[test]
    fn payment_confirmation_mentions_the_amount() {
        let (subject, html) =
            payment_confirmation("Jane Doe", dec!(42.5), "https://app.donatalk.test");
        assert!(subject.contains("42.50 USD"));
        assert!(html.contains("<strong>42.50 USD</strong>"));
    }
}
