const LAYOUT_OPEN: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">"#;

const LAYOUT_CLOSE: &str = "</body>\n</html>";

fn code_block(code: &str) -> String {
    format!(
        r#"<p style="font-size: 28px; letter-spacing: 4px; font-family: monospace; background: #f4f4f5; padding: 12px 20px; display: inline-block; border-radius: 4px;">{code}</p>"#
    )
}

pub fn render_password_reset(code: &str, ttl_minutes: i64) -> String {
    format!(
        r#"{LAYOUT_OPEN}
    <h2>Password Reset</h2>
    <p>A password reset was requested for your MultiTasker account. Use this code to choose a new password:</p>
    {code}
    <p style="color: #666; font-size: 14px;">The code expires in {ttl_minutes} minutes and works once. If you didn't request this, you can ignore it.</p>
{LAYOUT_CLOSE}"#,
        code = code_block(code),
    )
}

pub fn render_project_invite(project_title: &str, code: &str, base_url: &str) -> String {
    format!(
        r#"{LAYOUT_OPEN}
    <h2>You've been added to {project_title}</h2>
    <p>An account was created for you on MultiTasker. Set your password with this code:</p>
    {code}
    <p><a href="{base_url}" style="display: inline-block; padding: 10px 20px; background: #0070f3; color: white; text-decoration: none; border-radius: 4px;">Open MultiTasker</a></p>
{LAYOUT_CLOSE}"#,
        code = code_block(code),
    )
}
