use std::fmt::Write;

use crate::users::repo_types::HireableStatus;

pub fn status_color(status: HireableStatus) -> &'static str {
    match status {
        HireableStatus::Hireable => "#16a34a",
        HireableStatus::NearHireable => "#ca8a04",
        HireableStatus::Unhireable => "#dc2626",
        HireableStatus::NotAssessed => "#4b5563",
    }
}

pub fn subject(status: HireableStatus) -> String {
    format!("Your Intake Assessment Results: {}", status.label())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; }
.container { max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #e5e7eb; border-radius: 8px; }
.header { text-align: center; margin-bottom: 30px; }
.logo { font-size: 24px; font-weight: bold; color: #000; }
.status-box { padding: 20px; background-color: #f9fafb; border-radius: 8px; margin-bottom: 24px; text-align: center; }
.status-label { font-size: 14px; color: #6b7280; margin-bottom: 8px; text-transform: uppercase; }
.section { margin-bottom: 24px; }
.section-title { font-size: 16px; font-weight: bold; margin-bottom: 12px; border-bottom: 2px solid #f3f4f6; padding-bottom: 8px; }
.list-item { margin-bottom: 8px; padding-left: 12px; border-left: 3px solid #e5e7eb; }
.strength-item { border-left-color: #16a34a; }
.weakness-item { border-left-color: #dc2626; }
.footer { text-align: center; font-size: 12px; color: #9ca3af; margin-top: 40px; border-top: 1px solid #e5e7eb; padding-top: 20px; }
"#;

fn section(out: &mut String, title: &str, class: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, r#"<div class="section"><div class="section-title">{title}</div>"#);
    for item in items {
        let _ = write!(
            out,
            r#"<div class="list-item {class}">{}</div>"#,
            escape_html(item)
        );
    }
    out.push_str("</div>");
}

/// Assessment email body. User-supplied text is HTML-escaped.
pub fn render_assessment(
    user_name: &str,
    status: HireableStatus,
    strengths: &[String],
    weaknesses: &[String],
) -> String {
    let mut sections = String::new();
    section(&mut sections, "Key Strengths", "strength-item", strengths);
    section(&mut sections, "Areas for Improvement", "weakness-item", weaknesses);

    format!(
        r#"<!DOCTYPE html>
<html>
<head><style>{STYLE}.status-value {{ font-size: 24px; font-weight: bold; color: {color}; }}</style></head>
<body>
<div class="container">
<div class="header"><div class="logo">Intake</div><p>Feedback on your profile and submission</p></div>
<p>Hi {name},</p>
<p>We've reviewed your profile and submission. Here is our assessment of your current hireability status along with specific feedback.</p>
<div class="status-box"><div class="status-label">Current Status</div><div class="status-value">{label}</div></div>
{sections}
<div class="footer"><p>This is an automated message from the Intake team.</p></div>
</div>
</body>
</html>"#,
        color = status_color(status),
        name = escape_html(user_name),
        label = status.label(),
    )
}
