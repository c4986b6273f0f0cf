// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-page JavaScript snippets
//!
//! Every snippet is a self-invoking expression evaluated with
//! `Runtime.evaluate`. Caller-supplied strings are embedded as JSON string
//! literals so selectors and values cannot break out of the script.

fn literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Current document URL
pub const LOCATION_HREF: &str = "location.href";

/// Document readiness
pub const READY_STATE: &str = "document.readyState";

/// `true` if `selector` matches an element
pub fn selector_exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", literal(selector))
}

/// Set an input value and fire the events frameworks listen for.
/// Evaluates to `false` when nothing matches.
pub fn fill(selector: &str, value: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({selector});
  if (!el) return false;
  el.focus();
  const proto = Object.getPrototypeOf(el);
  const setter = Object.getOwnPropertyDescriptor(proto, "value");
  if (setter && setter.set) {{ setter.set.call(el, {value}); }} else {{ el.value = {value}; }}
  el.dispatchEvent(new Event("input", {{ bubbles: true }}));
  el.dispatchEvent(new Event("change", {{ bubbles: true }}));
  return true;
}})()"#,
        selector = literal(selector),
        value = literal(value),
    )
}

/// Click the first visible button whose name contains `label`.
/// Evaluates to `false` when no such button is rendered.
pub fn click_button(label: &str) -> String {
    format!(
        r#"(() => {{
  const wanted = {label}.toLowerCase();
  const candidates = document.querySelectorAll('button, [role="button"], input[type="submit"]');
  for (const el of candidates) {{
    const name = (el.getAttribute("aria-label") || el.innerText || el.value || "").toLowerCase();
    if (!name.includes(wanted)) continue;
    if (el.getClientRects().length === 0) continue;
    el.scrollIntoView({{ block: "center" }});
    el.click();
    return true;
  }}
  return false;
}})()"#,
        label = literal(label),
    )
}

/// Submit the owning form of the matched element.
/// Evaluates to `false` when the element is missing.
pub fn submit_form(selector: &str) -> String {
    format!(
        r#"(() => {{
  const el = document.querySelector({selector});
  if (!el) return false;
  if (el.form) el.form.submit();
  return true;
}})()"#,
        selector = literal(selector),
    )
}
