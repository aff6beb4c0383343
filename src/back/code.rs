// ----------------------------
// File: src/back/code.rs
// ----------------------------
//! The emitted-code buffer.
//!
//! While a function body is walked its final frame size is still settling,
//! so lines that reference a stack slot are buffered as `Slot` placeholders
//! holding the slot's allocation offset. Once the walk finishes,
//! `resolve` rewrites every placeholder against the final frame size and
//! the buffer collapses to plain text.

pub const TAB: &str = "    ";

#[derive(Debug, Clone)]
enum Line {
    Text(String),
    Slot { prefix: String, offset: i32, suffix: String },
}

#[derive(Debug, Clone, Default)]
pub struct Code {
    lines: Vec<Line>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding one plain line.
    pub fn line(text: impl Into<String>) -> Self {
        let mut code = Self::new();
        code.push(text);
        code
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(Line::Text(text.into()));
    }

    /// A line whose stack-slot operand is resolved later: it renders as
    /// `prefix`, then `frame size − offset`, then `suffix`.
    pub fn push_slot(&mut self, prefix: impl Into<String>, offset: i32, suffix: impl Into<String>) {
        self.lines.push(Line::Slot { prefix: prefix.into(), offset, suffix: suffix.into() });
    }

    pub fn push_label(&mut self, label: &str) {
        self.push(format!("{}:", label));
    }

    pub fn append(&mut self, mut other: Code) {
        self.lines.append(&mut other.lines);
    }

    /// Rewrite every slot placeholder against the final frame size and
    /// serialize, one line per entry, each terminated by a newline.
    pub fn resolve(self, stack_depth: i32) -> String {
        let mut out = String::new();
        for line in self.lines {
            match line {
                Line::Text(text) => out.push_str(&text),
                Line::Slot { prefix, offset, suffix } => {
                    out.push_str(&prefix);
                    out.push_str(&(stack_depth - offset).to_string());
                    out.push_str(&suffix);
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_resolve_against_the_frame_size() {
        let mut code = Code::new();
        code.push(format!("{}move $fp, $sp", TAB));
        code.push_slot(format!("{}lw $v0, ", TAB), 8, "($sp)");
        assert_eq!(code.resolve(24), "    move $fp, $sp\n    lw $v0, 16($sp)\n");
    }

    #[test]
    fn append_preserves_order() {
        let mut a = Code::line("one");
        a.append(Code::line("two"));
        assert_eq!(a.resolve(0), "one\ntwo\n");
    }
}
