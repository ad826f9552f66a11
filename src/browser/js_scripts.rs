//! JavaScript run inside the page by [`super::chromium::ChromiumDriver`]
//!
//! Locator scripts tag the matched element with a `data-mscrape-ref`
//! attribute and return `JSON.stringify`-ed `{ key, center, text }` or
//! `null`. Arguments are embedded as JSON literals, never concatenated raw.

use super::driver::Locator;

/// Attribute holding the element reference handed back to Rust
pub const REF_ATTRIBUTE: &str = "data-mscrape-ref";

const PRELUDE: &str = r#"
    const REF = 'data-mscrape-ref';
    const tag = (el) => {
        if (!el.hasAttribute(REF)) {
            window.__mscrapeSeq = (window.__mscrapeSeq || 0) + 1;
            el.setAttribute(REF, 'r' + window.__mscrapeSeq);
        }
        return el.getAttribute(REF);
    };
    const center = (el) => {
        const r = el.getBoundingClientRect();
        if (r.width === 0 && r.height === 0) return null;
        return { x: r.left + r.width / 2, y: r.top + r.height / 2 };
    };
    const describe = (el) => el ? {
        key: tag(el),
        center: center(el),
        text: (el.innerText || el.textContent || '').trim().slice(0, 200)
    } : null;
    const byRef = (key) => document.querySelector('[' + REF + '="' + key + '"]');
    const visible = (el) => {
        const style = window.getComputedStyle(el);
        return style.display !== 'none' && style.visibility !== 'hidden' && center(el) !== null;
    };
"#;

/// Readiness signal: story heading or a primary content container
const CONTENT_PRESENT: &str = r#"
    const el = document.querySelector(
        "h1[data-testid='storyTitle'], article h1, article, [data-testid='story-content'], main h1, [role='main'] h1"
    );
    return describe(el);
"#;

const ANCHOR: &str = r#"
    const normalize = (href) => {
        try {
            const u = new URL(href, location.origin);
            let p = u.pathname.replace(/\/+$/, '');
            return p === '' ? '/' : p;
        } catch (e) {
            return null;
        }
    };
    for (const a of document.querySelectorAll('a[href]')) {
        if (normalize(a.getAttribute('href')) === ARG.path) return describe(a);
    }
    return null;
"#;

/// Smallest ancestor that reads as an independent list item card
const CARD: &str = r#"
    const anchor = byRef(ARG.anchor);
    if (!anchor) return null;
    const marker = /card|postpreview|story|item/i;
    let el = anchor.parentElement;
    for (let depth = 0; el && el !== document.body && depth < 15; depth++, el = el.parentElement) {
        if (el.tagName === 'ARTICLE' || el.tagName === 'LI') return describe(el);
        const role = el.getAttribute('role');
        if (role === 'article' || role === 'listitem') return describe(el);
        const testid = el.getAttribute('data-testid') || '';
        if (marker.test(testid)) return describe(el);
        const parent = el.parentElement;
        if (parent && el.querySelector('button, [role="button"]')) {
            const siblings = Array.from(parent.children).filter(
                (s) => s !== el && s.tagName === el.tagName && s.querySelector('a[href]')
            );
            if (siblings.length > 0) return describe(el);
        }
    }
    return null;
"#;

const CONTROL: &str = r#"
    const card = byRef(ARG.card);
    if (!card) return null;
    const keywords = ARG.keywords.map((k) => k.toLowerCase());
    for (const el of card.querySelectorAll('button, [role="button"], a[aria-label]')) {
        const label = [
            el.getAttribute('aria-label'),
            el.getAttribute('title'),
            el.getAttribute('data-testid'),
            el.innerText
        ].filter(Boolean).join(' ').toLowerCase();
        if (keywords.some((k) => label.includes(k))) return describe(el);
    }
    return null;
"#;

const OVERLAY: &str = r#"
    const candidates = document.querySelectorAll(
        "[role='dialog'], [role='menu'], [role='listbox'], [aria-modal='true'], [data-testid*='popover' i], [data-testid*='overlay' i]"
    );
    for (const el of candidates) {
        if (visible(el)) return describe(el);
    }
    return null;
"#;

/// Deepest row inside the overlay whose text contains the list name,
/// with its checked state: `true` when the item is already in the list
const PICKER_ROW: &str = r#"
    const overlay = byRef(ARG.overlay);
    if (!overlay) return null;
    let best = null;
    for (const el of overlay.querySelectorAll(
        "[role='menuitemcheckbox'], [role='checkbox'], [role='menuitem'], [role='option'], label, li, button"
    )) {
        const text = (el.innerText || '').trim();
        if (!text.includes(ARG.label) || !visible(el)) continue;
        if (!best || text.length < (best.innerText || '').trim().length) best = el;
    }
    const stateOf = (node) => {
        if (node.tagName === 'INPUT') return node.checked;
        for (const attr of ['aria-checked', 'aria-pressed', 'aria-selected']) {
            const value = node.getAttribute(attr);
            if (value === 'true') return true;
            if (value === 'false') return false;
        }
        return null;
    };
    const checkedState = (row) => {
        const marks = row.querySelectorAll(
            "input[type='checkbox'], input[type='radio'], [aria-checked], [aria-pressed], [aria-selected]"
        );
        for (const node of [row, ...marks]) {
            const state = stateOf(node);
            if (state !== null) return state;
        }
        if (row.tagName === 'LABEL' && row.control) return row.control.checked;
        const holder = row.parentElement && row.parentElement.closest('[aria-checked], [aria-pressed], [aria-selected]');
        if (holder && overlay.contains(holder)) return stateOf(holder);
        return null;
    };
    const found = describe(best);
    if (found) found.checked = checkedState(best);
    return found;
"#;

const SCROLL_INTO_VIEW: &str = r#"
    const el = byRef(ARG.key);
    if (!el) return null;
    el.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' });
    return center(el);
"#;

fn wrap(body: &str, arg: serde_json::Value) -> String {
    format!(
        "(() => {{ const ARG = {arg}; {PRELUDE} const __result = (() => {{ {body} }})(); return JSON.stringify(__result); }})()"
    )
}

/// Script resolving `locator`; evaluates to a JSON string.
#[must_use]
pub fn locate(locator: &Locator) -> String {
    match locator {
        Locator::ContentPresent => wrap(CONTENT_PRESENT, serde_json::Value::Null),
        Locator::Anchor { path } => wrap(ANCHOR, serde_json::json!({ "path": path })),
        Locator::Card { anchor } => wrap(CARD, serde_json::json!({ "anchor": anchor })),
        Locator::Control { card, keywords } => wrap(
            CONTROL,
            serde_json::json!({ "card": card, "keywords": keywords }),
        ),
        Locator::Overlay => wrap(OVERLAY, serde_json::Value::Null),
        Locator::PickerRow { overlay, label } => wrap(
            PICKER_ROW,
            serde_json::json!({ "overlay": overlay, "label": label }),
        ),
    }
}

#[must_use]
pub fn scroll_into_view(key: &str) -> String {
    wrap(SCROLL_INTO_VIEW, serde_json::json!({ "key": key }))
}

pub const SCROLL_HEIGHT: &str = "Math.max(document.body ? document.body.scrollHeight : 0, document.documentElement.scrollHeight)";

pub const VIEWPORT_HEIGHT: &str = "window.innerHeight";

pub const OUTER_HTML: &str = "document.documentElement.outerHTML";

/// Status of the main document from the Navigation Timing entry; 0 if unknown
pub const RESPONSE_STATUS: &str = r"(() => {
    const entry = performance.getEntriesByType('navigation')[0];
    return entry && typeof entry.responseStatus === 'number' ? entry.responseStatus : 0;
})()";

#[must_use]
pub fn scroll_to(y: f64) -> String {
    format!("window.scrollTo(0, {y}); true")
}
