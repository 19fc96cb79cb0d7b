//! HTML element classification used by the lexer and the optimizer.
//!
//! These tables are configuration data, not parser logic: callers can swap
//! any of them out through `CompileOptions` predicates.

/// Void elements: cannot have children or a closing tag.
/// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "frame", "hr", "img", "input",
    "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements the parser may implicitly close when it meets the same tag
/// again while that tag is still open.
const LEFT_OPEN_ELEMENTS: &[&str] = &[
    "colgroup", "dd", "dt", "li", "options", "p", "td", "tfoot", "th",
    "thead", "tr", "source",
];

/// Flow-content elements that terminate an open <p>. Phrasing content may
/// nest inside a paragraph; anything on this list may not.
const NON_PHRASING_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "base", "blockquote", "body", "caption",
    "col", "colgroup", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "legend",
    "li", "menuitem", "meta", "optgroup", "option", "param", "rp", "rt",
    "source", "style", "summary", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "track",
];

/// Elements whose content is captured verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Elements that keep the source whitespace of their content.
const WHITESPACE_SENSITIVE_ELEMENTS: &[&str] = &["pre", "textarea"];

/// Elements that may not appear inside a template body because rendering
/// them would have side effects outside the component tree.
const FORBIDDEN_ELEMENTS: &[&str] = &["style", "script"];

/// Structural tags owned by the compiler rather than the platform.
const BUILT_IN_ELEMENTS: &[&str] = &["slot", "component"];

/// Known HTML element names, used to decide whether a tag is a platform
/// element or a user component.
const HTML_ELEMENTS: &[&str] = &[
    "html", "body", "base", "head", "link", "meta", "style", "title",
    "address", "article", "aside", "footer", "header", "h1", "h2", "h3",
    "h4", "h5", "h6", "hgroup", "nav", "section", "div", "dd", "dl", "dt",
    "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol", "p",
    "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code",
    "data", "dfn", "em", "i", "kbd", "mark", "q", "rp", "rt", "rtc", "ruby",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var", "wbr", "area", "audio", "map", "track", "video", "embed",
    "object", "param", "source", "canvas", "script", "noscript", "del",
    "ins", "caption", "col", "colgroup", "table", "thead", "tbody", "td",
    "th", "tr", "button", "datalist", "fieldset", "form", "input", "label",
    "legend", "meter", "optgroup", "option", "output", "progress", "select",
    "textarea", "details", "dialog", "menu", "menuitem", "summary",
    "content", "element", "shadow", "template", "blockquote", "iframe",
    "tfoot",
];

/// SVG element names treated as platform elements alongside HTML.
const SVG_ELEMENTS: &[&str] = &[
    "svg", "animate", "circle", "clippath", "cursor", "defs", "desc",
    "ellipse", "filter", "font-face", "foreignobject", "g", "glyph",
    "image", "line", "marker", "mask", "missing-glyph", "path", "pattern",
    "polygon", "polyline", "rect", "switch", "symbol", "text", "textpath",
    "tspan", "use", "view",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn can_be_left_open(tag: &str) -> bool {
    LEFT_OPEN_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_non_phrasing_element(tag: &str) -> bool {
    NON_PHRASING_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_raw_text_element(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_whitespace_sensitive_element(tag: &str) -> bool {
    WHITESPACE_SENSITIVE_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_forbidden_element(tag: &str) -> bool {
    FORBIDDEN_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn is_built_in_element(tag: &str) -> bool {
    BUILT_IN_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// True for tags the target platform renders natively. Anything else is
/// assumed to be a user-defined component.
pub fn is_reserved_element(tag: &str) -> bool {
    let lower = tag.to_ascii_lowercase();
    HTML_ELEMENTS.contains(&lower.as_str()) || SVG_ELEMENTS.contains(&lower.as_str())
}
