//! Lexical block extraction.
//!
//! Splits a `keymap.c` into the `keymaps` array and the top-level constructs
//! around it. Each construct keeps its exact source text (leading comments
//! and whitespace included), so the pieces concatenate back to the input.

use crate::error::ConvertError;
use crate::models::{AuxiliaryBlock, BlockKind, KeymapConstruct, Placement, SourceDocument};
use crate::parser::scan::{
    brackets_match, directive_end, find_top_level, first_identifier, identifiers, is_ident_char,
    last_identifier, malformed, skip_comment, skip_literal, skip_trivia, split_top_level,
    strip_comments, LineIndex,
};
use regex::Regex;
use std::sync::LazyLock;

static KEYMAP_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bkeymaps\s*\[\s*\]\s*\[\s*MATRIX_ROWS\s*\]\s*\[\s*MATRIX_COLS\s*\]")
        .expect("keymap declaration pattern compiles")
});

/// One top-level construct located by the scanner.
#[derive(Debug, Clone)]
struct Construct {
    /// Start of the leading trivia
    start: usize,
    /// Start of the construct proper
    body: usize,
    /// One past the last byte
    end: usize,
    line: usize,
    kind: BlockKind,
    name: String,
    defines: Vec<String>,
}

/// Splits `source` into the keymap array and its auxiliary blocks.
pub fn extract(source: &str) -> Result<SourceDocument, ConvertError> {
    let constructs = scan_constructs(source, 1)?;

    let keymap_idx = constructs
        .iter()
        .position(|c| c.kind == BlockKind::Table && is_keymap_declaration(&source[c.body..c.end]))
        .ok_or_else(|| missing_keymap(source, &constructs))?;

    let keymap = &constructs[keymap_idx];
    let keymap_construct = KeymapConstruct {
        leading: source[keymap.start..keymap.body].to_string(),
        text: source[keymap.body..keymap.end].to_string(),
        line: keymap.line,
    };

    let blocks: Vec<AuxiliaryBlock> = constructs
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != keymap_idx)
        .map(|(idx, c)| AuxiliaryBlock {
            name: c.name.clone(),
            kind: c.kind,
            text: source[c.start..c.end].to_string(),
            body_offset: c.body - c.start,
            line: c.line,
            placement: if idx < keymap_idx {
                Placement::BeforeKeymap
            } else {
                Placement::AfterKeymap
            },
            defines: c.defines.clone(),
        })
        .collect();

    tracing::debug!(
        blocks = blocks.len(),
        keymap_line = keymap_construct.line,
        "Extracted source blocks"
    );

    Ok(SourceDocument {
        blocks,
        keymap: keymap_construct,
    })
}

fn missing_keymap(source: &str, constructs: &[Construct]) -> ConvertError {
    let guarded = constructs.iter().find(|c| {
        c.kind == BlockKind::Conditional && KEYMAP_DECL.is_match(&strip_comments(&source[c.body..c.end]))
    });
    match guarded {
        Some(group) => ConvertError::malformed(
            "keymaps[][MATRIX_ROWS][MATRIX_COLS] is inside a preprocessor conditional",
            Some(group.line),
        ),
        None => ConvertError::malformed("no keymaps[][MATRIX_ROWS][MATRIX_COLS] definition found", None),
    }
}

fn is_keymap_declaration(text: &str) -> bool {
    let code = strip_comments(text);
    let header = find_top_level(&code, b'=').map_or(code.as_str(), |eq| &code[..eq]);
    KEYMAP_DECL.is_match(header)
}

/// Walks `src` one top-level construct at a time. `base_line` is the line
/// number of the first byte, so nested scans report absolute lines.
fn scan_constructs(src: &str, base_line: usize) -> Result<Vec<Construct>, ConvertError> {
    let bytes = src.as_bytes();
    let lines = LineIndex::new(src, base_line);
    let mut constructs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let body = skip_trivia(bytes, pos).map_err(|msg| malformed(msg, lines.line_of(pos)))?;
        if body >= bytes.len() {
            constructs.push(Construct {
                start: pos,
                body: bytes.len(),
                end: bytes.len(),
                line: lines.line_of(pos),
                kind: BlockKind::Trivia,
                name: String::new(),
                defines: Vec::new(),
            });
            break;
        }

        let line = lines.line_of(body);
        let mut construct = if bytes[body] == b'#' {
            scan_directive(src, body, &lines)?
        } else {
            scan_declaration(src, body, &lines)?
        };
        construct.start = pos;
        construct.line = line;
        pos = construct.end;
        constructs.push(construct);
    }

    Ok(constructs)
}

fn directive_word(line: &str) -> (&str, &str) {
    let after_hash = line.trim_start().trim_start_matches('#').trim_start();
    let word_len = after_hash.bytes().take_while(|b| is_ident_char(*b)).count();
    (&after_hash[..word_len], after_hash[word_len..].trim())
}

fn scan_directive(src: &str, body: usize, lines: &LineIndex) -> Result<Construct, ConvertError> {
    let bytes = src.as_bytes();
    let line_end = directive_end(bytes, body);
    let code = strip_comments(&src[body..line_end]);
    let (word, rest) = directive_word(&code);

    let mut construct = Construct {
        start: body,
        body,
        end: line_end,
        line: 0,
        kind: BlockKind::Directive,
        name: word.to_string(),
        defines: Vec::new(),
    };

    match word {
        "include" => {
            construct.kind = BlockKind::Include;
            construct.name = rest.to_string();
        }
        "define" => {
            construct.kind = BlockKind::Define;
            construct.name = first_identifier(rest).unwrap_or_default().to_string();
            construct.defines.push(construct.name.clone());
        }
        "if" | "ifdef" | "ifndef" => {
            let (inner_end, group_end) = conditional_end(src, line_end, lines)
                .map_err(|msg| malformed(msg, lines.line_of(body)))?;
            construct.kind = BlockKind::Conditional;
            construct.name = rest.split_whitespace().collect::<Vec<_>>().join(" ");
            construct.end = group_end;
            if rest != "0" {
                construct.defines = group_defines(&src[line_end..inner_end], lines.line_of(line_end));
            }
        }
        _ => {}
    }

    Ok(construct)
}

/// Finds the `#endif` closing a conditional whose opening line ends at
/// `from`. Returns the offset of that `#endif` and the end of its line.
fn conditional_end(src: &str, from: usize, lines: &LineIndex) -> Result<(usize, usize), &'static str> {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut at_line_start = true;
    let mut i = from;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            at_line_start = true;
            i += 1;
            continue;
        }
        if b == b' ' || b == b'\t' || b == b'\r' {
            i += 1;
            continue;
        }
        if at_line_start && b == b'#' {
            let line_end = directive_end(bytes, i);
            let (word, _) = directive_word(&src[i..line_end]);
            match word {
                "if" | "ifdef" | "ifndef" => depth += 1,
                "endif" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((i, line_end));
                    }
                }
                _ => {}
            }
            i = line_end;
            continue;
        }
        at_line_start = false;
        if let Some(end) = skip_comment(bytes, i)? {
            i = end;
            continue;
        }
        if b == b'"' || b == b'\'' {
            // Disabled branches may hold prose; a stray quote only skips itself.
            i = skip_literal(bytes, i).unwrap_or(i + 1);
            continue;
        }
        i += 1;
    }

    tracing::trace!(line = lines.line_of(from), "Conditional group never closed");
    Err("unterminated preprocessor conditional")
}

/// Names defined anywhere inside a conditional group's branches.
fn group_defines(inner: &str, base_line: usize) -> Vec<String> {
    match scan_constructs(inner, base_line) {
        Ok(children) => {
            let mut names: Vec<String> = Vec::new();
            for name in children.into_iter().flat_map(|c| c.defines) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            names
        }
        Err(err) => {
            tracing::debug!(line = base_line, "Skipping names in conditional group: {}", err);
            Vec::new()
        }
    }
}

fn scan_declaration(src: &str, body: usize, lines: &LineIndex) -> Result<Construct, ConvertError> {
    let bytes = src.as_bytes();
    let mut stack: Vec<(u8, usize)> = Vec::new();
    let mut top_level_eq = false;
    let mut function = false;
    let mut i = body;

    let end = loop {
        if i >= bytes.len() {
            return Err(match stack.last() {
                Some(&(open, at)) => malformed(&format!("unterminated '{}'", open as char), lines.line_of(at)),
                None => malformed("declaration is missing its terminating ';'", lines.line_of(body)),
            });
        }
        if let Some(next) = skip_comment(bytes, i).map_err(|msg| malformed(msg, lines.line_of(i)))? {
            i = next;
            continue;
        }
        match bytes[i] {
            b'"' | b'\'' => {
                i = skip_literal(bytes, i).map_err(|msg| malformed(msg, lines.line_of(i)))?;
                continue;
            }
            open @ (b'(' | b'[' | b'{') => {
                if open == b'{' && stack.is_empty() && !top_level_eq && is_function_header(&src[body..i]) {
                    function = true;
                }
                stack.push((open, i));
            }
            close @ (b')' | b']' | b'}') => {
                let Some((open, at)) = stack.pop() else {
                    return Err(malformed(&format!("unexpected '{}'", close as char), lines.line_of(i)));
                };
                if !brackets_match(open, close) {
                    return Err(malformed(&format!("unterminated '{}'", open as char), lines.line_of(at)));
                }
                if function && stack.is_empty() {
                    break i + 1;
                }
            }
            b'=' if stack.is_empty() => top_level_eq = true,
            b';' if stack.is_empty() => break i + 1,
            _ => {}
        }
        i += 1;
    };

    let (kind, name, defines) = classify(&src[body..end], function);
    Ok(Construct {
        start: body,
        body,
        end,
        line: 0,
        kind,
        name,
        defines,
    })
}

fn is_function_header(header: &str) -> bool {
    let code = strip_comments(header);
    let code = code.trim();
    code.ends_with(')') && first_identifier(code) != Some("typedef")
}

fn classify(text: &str, function: bool) -> (BlockKind, String, Vec<String>) {
    let code = strip_comments(text);
    let code = code.trim().trim_end_matches(';').trim_end();

    if function {
        let header = code.find('{').map_or(code, |brace| &code[..brace]);
        let name = find_top_level(header, b'(')
            .and_then(|paren| last_identifier(&header[..paren]))
            .unwrap_or_default()
            .to_string();
        return (BlockKind::Function, name.clone(), vec![name]);
    }

    if code.is_empty() {
        return (BlockKind::Trivia, String::new(), Vec::new());
    }

    let leading = identifiers(code);
    let keyword = leading
        .iter()
        .copied()
        .find(|ident| !matches!(*ident, "static" | "const" | "volatile" | "extern"))
        .unwrap_or_default();

    match keyword {
        "typedef" => classify_typedef(code),
        "enum" if code.contains('{') => {
            let (tag, enumerators, declarators) = aggregate_parts(code);
            let name = tag
                .clone()
                .or_else(|| enumerators.first().cloned())
                .unwrap_or_default();
            let defines = tag.into_iter().chain(enumerators).chain(declarators).collect();
            (BlockKind::Enum, name, defines)
        }
        "struct" | "union" if code.contains('{') && find_top_level(code, b'=').is_none() => {
            let (tag, _, declarators) = aggregate_parts(code);
            let name = tag
                .clone()
                .or_else(|| declarators.first().cloned())
                .unwrap_or_default();
            let defines = tag.into_iter().chain(declarators).collect();
            (BlockKind::Record, name, defines)
        }
        _ => classify_declaration(code),
    }
}

/// Tag, enumerators and trailing declarators of an `enum`/`struct` body.
fn aggregate_parts(code: &str) -> (Option<String>, Vec<String>, Vec<String>) {
    let Some(open) = code.find('{') else {
        return (None, Vec::new(), Vec::new());
    };
    let tag = identifiers(&code[..open])
        .into_iter()
        .filter(|ident| {
            !matches!(
                *ident,
                "typedef" | "enum" | "struct" | "union" | "static" | "const" | "volatile" | "extern"
            )
        })
        .last()
        .map(str::to_string);

    let close = code.rfind('}').unwrap_or(code.len());
    let inner = if close > open { &code[open + 1..close] } else { "" };
    let enumerators = split_top_level(inner, b',')
        .into_iter()
        .filter_map(first_identifier)
        .map(str::to_string)
        .collect();

    let trailing = code.get(close + 1..).unwrap_or_default();
    (tag, enumerators, declarator_names(trailing))
}

/// Declared names of a comma-separated declarator list.
fn declarator_names(code: &str) -> Vec<String> {
    split_top_level(code, b',')
        .into_iter()
        .filter_map(|piece| {
            let piece = find_top_level(piece, b'=').map_or(piece, |eq| &piece[..eq]);
            let piece = find_top_level(piece, b'[').map_or(piece, |br| &piece[..br]);
            last_identifier(piece)
        })
        .map(str::to_string)
        .collect()
}

fn classify_typedef(code: &str) -> (BlockKind, String, Vec<String>) {
    if code.contains('{') {
        let (_, enumerators, declarators) = aggregate_parts(code);
        let name = declarators.first().cloned().unwrap_or_default();
        let is_enum = identifiers(code).get(1) == Some(&"enum");
        let mut defines = declarators;
        if is_enum {
            defines.extend(enumerators);
        }
        return (BlockKind::Typedef, name, defines);
    }

    let name = match code.find("(*") {
        Some(star) => first_identifier(&code[star + 2..]),
        None => {
            let head = find_top_level(code, b'[').map_or(code, |br| &code[..br]);
            last_identifier(head)
        }
    }
    .unwrap_or_default()
    .to_string();
    (BlockKind::Typedef, name.clone(), vec![name])
}

fn classify_declaration(code: &str) -> (BlockKind, String, Vec<String>) {
    if let Some(eq) = find_top_level(code, b'=') {
        let lhs = &code[..eq];
        let rhs = code[eq + 1..].trim_start();
        let declarators = declarator_names(code);
        let name = declarators.first().cloned().unwrap_or_default();
        let kind = if lhs.contains('[') && rhs.starts_with('{') {
            BlockKind::Table
        } else {
            BlockKind::Variable
        };
        return (kind, name, declarators);
    }

    if let Some(paren) = find_top_level(code, b'(') {
        let after = code[paren + 1..].trim_start();
        if let Some(pointer) = after.strip_prefix('*') {
            let name = first_identifier(pointer).unwrap_or_default().to_string();
            return (BlockKind::Variable, name.clone(), vec![name]);
        }
        let name = last_identifier(&code[..paren]).unwrap_or_default().to_string();
        return (BlockKind::Prototype, name.clone(), vec![name]);
    }

    let declarators = declarator_names(code);
    let name = declarators.first().cloned().unwrap_or_default();
    (BlockKind::Variable, name, declarators)
}
