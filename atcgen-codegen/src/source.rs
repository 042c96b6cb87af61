//! Indented source text builder

const INDENT: &str = "    ";

/// Line-oriented builder for generated source
#[derive(Debug, Default)]
pub struct SourceBuilder {
    lines: Vec<String>,
    indent_level: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", INDENT.repeat(self.indent_level), line));
        }
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn decrease_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Joined text with a trailing newline
    pub fn build(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut b = SourceBuilder::new();
        b.line("class A {");
        b.increase_indent();
        b.line("int x;");
        b.blank();
        b.decrease_indent();
        b.decrease_indent();
        b.line("}");
        assert_eq!(b.build(), "class A {\n    int x;\n\n}\n");
    }
}
