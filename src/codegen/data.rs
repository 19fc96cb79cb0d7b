use super::{json_str, transform_special_newlines, CodegenState};
use crate::ast::{Ast, Attr, Directive, EventHandler, NodeId};
use crate::options::DirectiveCode;
use std::collections::HashMap;

type Wrapper = Box<dyn FnOnce(String) -> String>;

/// What the directive pass contributed: entries for the runtime plus
/// wrappers that rewrite the finished data object.
struct DirectiveOutput {
    runtime: Option<String>,
    wrap_data: Option<Wrapper>,
    wrap_listeners: Option<Wrapper>,
}

impl<'a> CodegenState<'a> {
    /// Assembles the element's data object expression. Directives go first
    /// because their generators may install wrappers applied at the end.
    pub(super) fn gen_data(&mut self, ast: &Ast, id: NodeId) -> String {
        let mut data = String::from("{");
        let dirs = self.gen_directives(ast, id);
        if let Some(runtime) = &dirs.runtime {
            data.push_str(runtime);
            data.push(',');
        }
        let el = ast.element(id);
        if let Some(key) = &el.key {
            data.push_str(&format!("key:{},", key));
        }
        if let Some(ref_expr) = &el.ref_expr {
            data.push_str(&format!("ref:{},", ref_expr));
        }
        if el.ref_in_for {
            data.push_str("refInFor:true,");
        }
        let opts = self.opts;
        for module in &opts.modules {
            if let Some(fragment) = module.gen_data(el) {
                data.push_str(&fragment);
            }
        }
        if !el.attrs.is_empty() {
            data.push_str(&format!("attrs:{},", gen_props(&el.attrs)));
        }
        if !el.events.is_empty() {
            data.push_str(&gen_handlers(&el.events));
            data.push(',');
        }
        if let Some(target) = &el.slot_target {
            data.push_str(&format!("slot:{},", target));
        }
        if data.ends_with(',') {
            data.pop();
        }
        data.push('}');
        if !el.dynamic_attrs.is_empty() {
            data = format!("_b({},\"{}\",{})", data, el.tag, gen_props(&el.dynamic_attrs));
        }
        if let Some(wrap) = dirs.wrap_data {
            data = wrap(data);
        }
        if let Some(wrap) = dirs.wrap_listeners {
            data = wrap(data);
        }
        data
    }

    fn gen_directives(&mut self, ast: &Ast, id: NodeId) -> DirectiveOutput {
        let mut out = DirectiveOutput { runtime: None, wrap_data: None, wrap_listeners: None };
        let el = ast.element(id);
        if el.directives.is_empty() {
            return out;
        }
        let opts = self.opts;
        let mut entries: Vec<String> = Vec::new();
        for dir in &el.directives {
            let code = match opts.directives.get(&dir.name) {
                Some(handler) => handler.generate(el, dir, self.warnings),
                // unknown to the compiler, the runtime resolves it
                None => DirectiveCode::Runtime,
            };
            match code {
                DirectiveCode::None => {}
                DirectiveCode::Runtime => entries.push(render_directive(dir)),
                DirectiveCode::WrapData(wrap) => out.wrap_data = Some(wrap),
                DirectiveCode::WrapListeners(wrap) => out.wrap_listeners = Some(wrap),
            }
        }
        if !entries.is_empty() {
            out.runtime = Some(format!("directives:[{}]", entries.join(",")));
        }
        out
    }
}

fn render_directive(dir: &Directive) -> String {
    let mut out = format!("{{name:\"{}\",rawName:\"{}\"", dir.name, dir.raw_name);
    if !dir.value.is_empty() {
        out.push_str(&format!(",value:({}),expression:{}", dir.value, json_str(&dir.value)));
    }
    if let Some(arg) = &dir.arg {
        if dir.is_dynamic_arg {
            out.push_str(&format!(",arg:{}", arg));
        } else {
            out.push_str(&format!(",arg:\"{}\"", arg));
        }
    }
    if !dir.modifiers.is_empty() {
        let mods: Vec<String> =
            dir.modifiers.iter().map(|m| format!("\"{}\":true", m)).collect();
        out.push_str(&format!(",modifiers:{{{}}}", mods.join(",")));
    }
    out.push('}');
    out
}

/// Renders the `on:` listener map. Repeats of one event name merge into an
/// array in source order; dynamic names move to an `_d` pair list.
pub(super) fn gen_handlers(events: &[EventHandler]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&EventHandler>> = HashMap::new();
    for handler in events {
        let entry = grouped.entry(handler.name.as_str()).or_default();
        if entry.is_empty() {
            order.push(&handler.name);
        }
        entry.push(handler);
    }
    let mut static_handlers = String::new();
    let mut dynamic_handlers = String::new();
    for name in order {
        let group = &grouped[name];
        let code = if group.len() == 1 {
            gen_handler(group[0])
        } else {
            let parts: Vec<String> = group.iter().map(|h| gen_handler(h)).collect();
            format!("[{}]", parts.join(","))
        };
        if group.len() == 1 && group[0].dynamic {
            dynamic_handlers.push_str(&format!("{},{},", name, code));
        } else {
            static_handlers.push_str(&format!("\"{}\":{},", name, code));
        }
    }
    if static_handlers.ends_with(',') {
        static_handlers.pop();
    }
    if dynamic_handlers.is_empty() {
        format!("on:{{{}}}", static_handlers)
    } else {
        dynamic_handlers.pop();
        format!("on:_d({{{}}},[{}])", static_handlers, dynamic_handlers)
    }
}

/// A handler that is already a path or function expression passes through;
/// anything else becomes an inline `$event` function, with a `return` when
/// the statement is a call whose result matters.
fn gen_handler(handler: &EventHandler) -> String {
    let value = handler.value.as_str();
    if is_simple_path(value) || is_function_expression(value) {
        return value.to_string();
    }
    if is_function_invocation(value) {
        format!("function($event){{return {}}}", value)
    } else {
        format!("function($event){{{}}}", value)
    }
}

/// Renders an attribute list as an object literal, splitting statically
/// named entries from `_d` name/value pairs resolved at runtime.
pub(super) fn gen_props(props: &[Attr]) -> String {
    let mut static_props = String::new();
    let mut dynamic_props = String::new();
    for prop in props {
        let value = transform_special_newlines(&prop.value);
        if prop.dynamic {
            dynamic_props.push_str(&format!("{},{},", prop.name, value));
        } else {
            static_props.push_str(&format!("\"{}\":{},", prop.name, value));
        }
    }
    if static_props.ends_with(',') {
        static_props.pop();
    }
    if dynamic_props.is_empty() {
        format!("{{{}}}", static_props)
    } else {
        dynamic_props.pop();
        format!("_d({{{}}},[{}])", static_props, dynamic_props)
    }
}

// === Handler shape scanners ===

// `[A-Za-z_$][A-Za-z0-9_$]*`; returns the end of the run, or `start` when
// the first character does not qualify.
fn scan_js_ident(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' || bytes[i] == b'$')
    {
        i += 1;
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$')
        {
            i += 1;
        }
    }
    i
}

// One `[...]` member access: a quoted string, an integer, or an identifier.
// Returns the position after the closing bracket.
fn scan_bracket_segment(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if i >= bytes.len() {
        return None;
    }
    match bytes[i] {
        quote @ (b'\'' | b'"') => {
            i += 1;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return None;
            }
            i += 1;
        }
        b'0'..=b'9' => {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
        _ => {
            let end = scan_js_ident(bytes, i);
            if end == i {
                return None;
            }
            i = end;
        }
    }
    if i < bytes.len() && bytes[i] == b']' {
        Some(i + 1)
    } else {
        None
    }
}

/// A bare member-expression path like `handler`, `a.b.c` or `a['x'][0]`.
fn is_simple_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = scan_js_ident(bytes, 0);
    if i == 0 {
        return false;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'.' => {
                let end = scan_js_ident(bytes, i + 1);
                if end == i + 1 {
                    return false;
                }
                i = end;
            }
            b'[' => match scan_bracket_segment(bytes, i) {
                Some(end) => i = end,
                None => return false,
            },
            _ => return false,
        }
    }
    true
}

/// An arrow function or a `function` keyword expression.
fn is_function_expression(value: &str) -> bool {
    let bytes = value.as_bytes();
    let ident_end = scan_js_ident(bytes, 0);
    if ident_end > 0 && value[ident_end..].trim_start().starts_with("=>") {
        return true;
    }
    if value.starts_with('(') {
        if let Some(close) = value.find(')') {
            if value[close + 1..].trim_start().starts_with("=>") {
                return true;
            }
        }
    }
    if let Some(rest) = value.strip_prefix("function") {
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            // whitespace may separate an optional function name
            let name_end = scan_js_ident(trimmed.as_bytes(), 0);
            return trimmed[name_end..].trim_start().starts_with('(');
        }
        return rest.starts_with('(');
    }
    false
}

/// Ends with a call, e.g. `go($event)` or `do.it(a);`, so the inline
/// wrapper should return its result.
fn is_function_invocation(value: &str) -> bool {
    let open = match value.rfind('(') {
        Some(open) => open,
        None => return false,
    };
    let rest = &value[open + 1..];
    let close = match rest.find(')') {
        Some(close) => close,
        None => return false,
    };
    rest[close + 1..].chars().all(|c| c == ';')
}

// === Tests ===
