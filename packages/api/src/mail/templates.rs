//! Email bodies as (html, text) pairs. Kept deliberately plain so they render
//! the same in every client.

use chrono::NaiveDate;

fn dollars(amount_cents: i64) -> String {
    format!("${}.{:02}", amount_cents / 100, amount_cents % 100)
}

fn long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn layout(title: &str, body_html: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f5f5f4; color: #1c1917;">
    <table role="presentation" style="width: 100%; border-collapse: collapse;">
        <tr>
            <td style="padding: 32px 16px;">
                <table role="presentation" style="max-width: 560px; margin: 0 auto; background: #ffffff; border-radius: 12px; border: 1px solid #e7e5e4;">
                    <tr>
                        <td style="padding: 28px 32px 16px; border-bottom: 1px solid #e7e5e4;">
                            <span style="font-size: 22px; font-weight: 700; color: #ea580c;">Restomate</span>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 28px 32px;">
{body_html}
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 20px 32px; border-top: 1px solid #e7e5e4;">
                            <p style="margin: 0; font-size: 12px; color: #78716c;">
                                You are receiving this email because of activity on your Restomate account.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"##
    )
}

pub fn verification(first_name: &str, verify_url: &str) -> (String, String) {
    let body = format!(
        r#"                            <p style="margin: 0 0 16px; font-size: 16px; line-height: 1.6;">Hi {first_name},</p>
                            <p style="margin: 0 0 24px; font-size: 16px; line-height: 1.6;">Welcome to Restomate! Please confirm your email address to finish setting up your account.</p>
                            <p style="margin: 0 0 24px; text-align: center;">
                                <a href="{verify_url}" style="display: inline-block; background: #ea580c; color: #ffffff; text-decoration: none; font-size: 16px; font-weight: 600; padding: 12px 28px; border-radius: 8px;">Verify my email</a>
                            </p>
                            <p style="margin: 0; font-size: 13px; color: #78716c;">The link is valid for 48 hours. If you did not create an account, you can ignore this email.</p>"#
    );
    let html = layout("Verify your email", &body);
    let text = format!(
        "Hi {first_name},\n\n\
         Welcome to Restomate! Please confirm your email address by opening this link:\n\n\
         {verify_url}\n\n\
         The link is valid for 48 hours. If you did not create an account, you can ignore this email.\n"
    );
    (html, text)
}

pub fn trial_started(first_name: &str, restaurant_name: &str, end_date: NaiveDate) -> (String, String) {
    let until = long_date(end_date);
    let body = format!(
        r#"                            <p style="margin: 0 0 16px; font-size: 16px; line-height: 1.6;">Hi {first_name},</p>
                            <p style="margin: 0 0 16px; font-size: 16px; line-height: 1.6;">Your free trial for <strong>{restaurant_name}</strong> has started. Everything is unlocked until <strong>{until}</strong>.</p>
                            <p style="margin: 0; font-size: 13px; color: #78716c;">You can add a payment method from the dashboard at any time before the trial ends.</p>"#
    );
    let html = layout("Your trial has started", &body);
    let text = format!(
        "Hi {first_name},\n\n\
         Your free trial for {restaurant_name} has started. Everything is unlocked until {until}.\n\n\
         You can add a payment method from the dashboard at any time before the trial ends.\n"
    );
    (html, text)
}

pub fn payment_confirmation(
    first_name: &str,
    restaurant_name: &str,
    end_date: NaiveDate,
    amount_cents: i64,
) -> (String, String) {
    let until = long_date(end_date);
    let amount = dollars(amount_cents);
    let body = format!(
        r#"                            <p style="margin: 0 0 16px; font-size: 16px; line-height: 1.6;">Hi {first_name},</p>
                            <p style="margin: 0 0 16px; font-size: 16px; line-height: 1.6;">Thank you for your payment of <strong>{amount}</strong>. The subscription for <strong>{restaurant_name}</strong> now runs until <strong>{until}</strong>.</p>
                            <p style="margin: 0; font-size: 13px; color: #78716c;">This email is your receipt; no further action is needed.</p>"#
    );
    let html = layout("Payment received", &body);
    let text = format!(
        "Hi {first_name},\n\n\
         Thank you for your payment of {amount}. The subscription for {restaurant_name} now runs until {until}.\n\n\
         This email is your receipt; no further action is needed.\n"
    );
    (html, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_render_with_two_decimal_places() {
        assert_eq!(dollars(2000), "$20.00");
        assert_eq!(dollars(2005), "$20.05");
        assert_eq!(dollars(99), "$0.99");
    }
}
