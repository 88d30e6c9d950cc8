//! Page scripts evaluated through `Runtime.evaluate`.
//!
//! Lookups follow accessible names: a `<label>` bound to its control, an
//! `aria-label`, or `aria-labelledby`. Text comparison collapses whitespace
//! and is otherwise exact. Every script is a synchronous expression that
//! returns JSON.

/// Attribute placed on the element a following CDP call should act on
pub const TARGET_ATTR: &str = "data-themeshot-target";
pub const TARGET_SELECTOR: &str = "[data-themeshot-target]";

const PRELUDE: &str = r#"
const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
const visible = (el) => {
  if (!el || !el.isConnected) return false;
  const style = window.getComputedStyle(el);
  if (style.visibility === 'hidden' || style.display === 'none') return false;
  return el.getClientRects().length > 0;
};
const controlFor = (label) => {
  const want = norm(label);
  for (const l of document.querySelectorAll('label')) {
    if (norm(l.textContent).replace(/:$/, '') === want && l.control) return l.control;
  }
  for (const el of document.querySelectorAll('input, select, textarea')) {
    if (norm(el.getAttribute('aria-label')) === want) return el;
  }
  for (const el of document.querySelectorAll('[aria-labelledby]')) {
    const text = el.getAttribute('aria-labelledby').split(/\s+/)
      .map((id) => { const ref = document.getElementById(id); return ref ? ref.textContent : ''; })
      .join(' ');
    if (norm(text) === want) return el;
  }
  return null;
};
const buttonNamed = (name) => {
  const want = norm(name);
  const candidates = document.querySelectorAll(
    'button, [role="button"], input[type="submit"], input[type="button"]');
  for (const el of candidates) {
    if (!visible(el) || el.disabled) continue;
    const text = el.tagName === 'INPUT' ? el.value : el.textContent;
    if (norm(el.getAttribute('aria-label')) === want || norm(text) === want) return el;
  }
  return null;
};
const clearMarks = () => {
  document.querySelectorAll('[data-themeshot-target]')
    .forEach((el) => el.removeAttribute('data-themeshot-target'));
};
"#;

fn literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn wrap(body: &str) -> String {
    format!("(() => {{{}\n{}\n}})()", PRELUDE, body)
}

/// `true` when a visible, enabled control carries this label
pub fn field_present(label: &str) -> String {
    wrap(&format!(
        "const el = controlFor({});\nreturn visible(el) && !el.disabled;",
        literal(label)
    ))
}

/// Empty the labelled input and mark it for typing.
///
/// The value is reset through the prototype setter and an `input` event so
/// that framework-managed inputs see the change.
pub fn mark_field(label: &str) -> String {
    wrap(&format!(
        r#"const el = controlFor({});
if (!visible(el) || el.disabled) return false;
clearMarks();
if (el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement) {{
  const proto = el instanceof HTMLTextAreaElement
    ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype;
  Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, '');
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
}}
el.setAttribute('{}', '1');
return true;"#,
        literal(label),
        TARGET_ATTR
    ))
}

/// Mark the visible, enabled button with this accessible name
pub fn mark_button(name: &str) -> String {
    wrap(&format!(
        r#"const el = buttonNamed({});
if (!el) return false;
clearMarks();
el.setAttribute('{}', '1');
return true;"#,
        literal(name),
        TARGET_ATTR
    ))
}

pub fn clear_marks() -> String {
    wrap("clearMarks();\nreturn true;")
}

/// Pick an option by value or text. `single-page`, `Single Page` and
/// `single_page` all name the same option.
pub fn select_option(label: &str, option: &str) -> String {
    wrap(&format!(
        r#"const el = controlFor({});
if (!visible(el) || el.disabled || !(el instanceof HTMLSelectElement)) return false;
const key = (s) => norm(s).toLowerCase().replace(/[\s_]+/g, '-');
const want = key({});
const opt = Array.from(el.options).find((o) => key(o.value) === want || key(o.textContent) === want);
if (!opt) return false;
Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set.call(el, opt.value);
el.dispatchEvent(new Event('input', {{ bubbles: true }}));
el.dispatchEvent(new Event('change', {{ bubbles: true }}));
return true;"#,
        literal(label),
        literal(option)
    ))
}

pub fn heading_visible(text: &str) -> String {
    wrap(&format!(
        r#"const want = norm({});
return Array.from(document.querySelectorAll('h1, h2, h3, h4, h5, h6, [role="heading"]'))
  .some((h) => visible(h) && norm(h.textContent) === want);"#,
        literal(text)
    ))
}

/// Rendered text only: `innerText` skips hidden nodes
pub fn text_visible(text: &str) -> String {
    wrap(&format!(
        "return norm(document.body ? document.body.innerText : '').includes(norm({}));",
        literal(text)
    ))
}

pub fn network_snapshot() -> String {
    wrap(
        r#"return {
  ready: document.readyState === 'complete',
  resources: performance.getEntriesByType('resource').length,
};"#,
    )
}

/// Document loaded, fonts loaded, no finite animation still running
pub fn rendering_settled() -> String {
    wrap(
        r#"if (document.readyState !== 'complete') return false;
if (document.fonts && document.fonts.status !== 'loaded') return false;
if (!document.getAnimations) return true;
return document.getAnimations().every((a) => {
  if (a.playState !== 'running' || !a.effect) return true;
  return !Number.isFinite(a.effect.getComputedTiming().endTime);
});"#,
    )
}

pub fn scroll_to(y: u32) -> String {
    format!("(() => {{ window.scrollTo(0, {}); return true; }})()", y)
}
