//! XML encoding of a [`Program`].
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode23">
//!   <instruction order="1" opcode="DEFVAR">
//!     <arg1 type="var">GF@x</arg1>
//!   </instruction>
//! </program>
//! ```
//!
//! Elements without content are written self-closing.

use std::fmt::{self, Display, Formatter, Write};

use crate::instruction::{Instruction, Operand};
use crate::program::Program;

pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct XmlOptions {
    /// Emit the `<?xml ...?>` declaration.
    pub declaration: bool,
    /// Spaces per nesting level. `None` puts everything on one line.
    pub indent: Option<usize>,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self { declaration: true, indent: Some(2) }
    }
}

/// Displays a program as XML.
pub struct ProgramXml<'a> {
    pub program: &'a Program,
    pub options: XmlOptions,
}

impl<'a> Display for ProgramXml<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_program(self.program, &self.options, f)
    }
}

pub fn to_xml(program: &Program, options: &XmlOptions) -> String {
    ProgramXml { program, options: *options }.to_string()
}

pub fn write_program<W: Write>(program: &Program, options: &XmlOptions, out: &mut W) -> fmt::Result {
    let mut writer = Writer { out, indent: options.indent };
    if options.declaration {
        writer.out.write_str(DECLARATION)?;
        writer.newline()?;
    }

    let language = [("language", program.language().to_string())];
    if program.is_empty() {
        writer.empty_element(0, "program", &language)?;
    } else {
        writer.start_element(0, "program", &language)?;
        writer.newline()?;
        for instruction in program.instructions() {
            write_instruction(&mut writer, instruction)?;
        }
        writer.end_element(0, "program")?;
    }
    writer.newline()
}

fn write_instruction<W: Write>(writer: &mut Writer<W>, instruction: &Instruction) -> fmt::Result {
    let attributes = [
        ("order", instruction.order().to_string()),
        ("opcode", instruction.opcode().mnemonic().to_string()),
    ];
    if instruction.operands().is_empty() {
        writer.empty_element(1, "instruction", &attributes)?;
        return writer.newline();
    }

    writer.start_element(1, "instruction", &attributes)?;
    writer.newline()?;
    for (index, operand) in instruction.operands().iter().enumerate() {
        write_operand(writer, index + 1, operand)?;
    }
    writer.end_element(1, "instruction")?;
    writer.newline()
}

fn write_operand<W: Write>(writer: &mut Writer<W>, slot: usize, operand: &Operand) -> fmt::Result {
    let name = format!("arg{}", slot);
    let attributes = [("type", operand.type_tag().into_owned())];
    let text = operand.text();
    if text.is_empty() {
        writer.empty_element(2, &name, &attributes)?;
    } else {
        writer.start_element(2, &name, &attributes)?;
        writer.out.write_str(&escape_text(&text))?;
        writer.end_element(0, &name)?;
    }
    writer.newline()
}

struct Writer<'w, W> {
    out: &'w mut W,
    indent: Option<usize>,
}

impl<'w, W: Write> Writer<'w, W> {
    fn newline(&mut self) -> fmt::Result {
        match self.indent {
            Some(_) => self.out.write_char('\n'),
            None => Ok(()),
        }
    }

    fn pad(&mut self, depth: usize) -> fmt::Result {
        let width = self.indent.unwrap_or(0) * depth;
        write!(self.out, "{:width$}", "", width = width)
    }

    fn open(&mut self, depth: usize, name: &str, attributes: &[(&str, String)]) -> fmt::Result {
        self.pad(depth)?;
        write!(self.out, "<{}", name)?;
        for (key, value) in attributes {
            write!(self.out, " {}=\"{}\"", key, escape_attribute(value))?;
        }
        Ok(())
    }

    fn start_element(&mut self, depth: usize, name: &str, attributes: &[(&str, String)]) -> fmt::Result {
        self.open(depth, name, attributes)?;
        self.out.write_char('>')
    }

    fn empty_element(&mut self, depth: usize, name: &str, attributes: &[(&str, String)]) -> fmt::Result {
        self.open(depth, name, attributes)?;
        self.out.write_str("/>")
    }

    fn end_element(&mut self, depth: usize, name: &str) -> fmt::Result {
        self.pad(depth)?;
        write!(self.out, "</{}>", name)
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::{translate, LeniencyLevel};

    fn program(source: &str) -> Program {
        translate(source, LeniencyLevel::Lenient).unwrap()
    }

    #[test]
    fn pretty() {
        let program = program(".IPPcode23\nDEFVAR GF@x\nMOVE GF@x int@0x1F\nCREATEFRAME\n");
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<program language="IPPcode23">
  <instruction order="1" opcode="DEFVAR">
    <arg1 type="var">GF@x</arg1>
  </instruction>
  <instruction order="2" opcode="MOVE">
    <arg1 type="var">GF@x</arg1>
    <arg2 type="int">0x1F</arg2>
  </instruction>
  <instruction order="3" opcode="CREATEFRAME"/>
</program>
"#;
        assert_eq!(expected, to_xml(&program, &XmlOptions::default()));
    }

    #[test]
    fn compact() {
        let program = program(".IPPcode23\nread LF@a bool\n");
        let options = XmlOptions { declaration: false, indent: None };
        assert_eq!(
            r#"<program language="IPPcode23"><instruction order="1" opcode="READ"><arg1 type="var">LF@a</arg1><arg2 type="type">bool</arg2></instruction></program>"#,
            to_xml(&program, &options));
    }

    #[test]
    fn empty_program() {
        let program = program(".IPPcode23\n");
        assert_eq!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode23\"/>\n",
            to_xml(&program, &XmlOptions::default()));
    }

    #[test]
    fn escapes_and_empty_strings() {
        let program = program(".IPPcode23\nWRITE string@a<b>&c\"d\nWRITE string@\n");
        let options = XmlOptions { declaration: false, indent: Some(1) };
        let expected = concat!(
            "<program language=\"IPPcode23\">\n",
            " <instruction order=\"1\" opcode=\"WRITE\">\n",
            "  <arg1 type=\"string\">a&lt;b&gt;&amp;c\"d</arg1>\n",
            " </instruction>\n",
            " <instruction order=\"2\" opcode=\"WRITE\">\n",
            "  <arg1 type=\"string\"/>\n",
            " </instruction>\n",
            "</program>\n",
        );
        assert_eq!(expected, to_xml(&program, &options));
    }

    #[test]
    fn string_escapes_stay_raw() {
        let program = program(".IPPcode23\nWRITE string@a\\032b\n");
        let xml = to_xml(&program, &XmlOptions::default());
        assert!(xml.contains(r#"<arg1 type="string">a\032b</arg1>"#), "{}", xml);
    }

    #[test]
    fn trailing_unicode_space_is_kept() {
        let program = program(".IPPcode23\nWRITE string@x\u{3000}\n");
        let xml = to_xml(&program, &XmlOptions::default());
        assert!(xml.contains("<arg1 type=\"string\">x\u{3000}</arg1>"), "{}", xml);
    }

    #[test]
    fn attribute_escaping() {
        assert_eq!("a&amp;&quot;&lt;", escape_attribute("a&\"<"));
    }

    #[test]
    fn display_matches_to_xml() {
        let program = program(".IPPcode23\nLABEL end\n");
        let options = XmlOptions::default();
        assert_eq!(to_xml(&program, &options), ProgramXml { program: &program, options }.to_string());
    }
}
