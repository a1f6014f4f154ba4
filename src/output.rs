//! Output sinks which render decoded structures as text.

use std::fmt;
use std::fmt::Write as FmtWrite;
use std::io;

use crate::structure::Header;

/// Receives decoded SMBIOS data in the order it should be displayed.
pub trait Output {
    /// A "# text" comment line.
    fn comment(&mut self, text: fmt::Arguments);

    /// A bare informational line.
    fn info(&mut self, text: fmt::Arguments);

    /// The "Handle 0x0000, DMI type N, N bytes" line opening a structure.
    fn handle(&mut self, header: &Header);

    /// The name line naming a structure's type.
    fn handle_name(&mut self, name: &str);

    /// A "Name: value" attribute line.
    fn attr(&mut self, name: &str, value: fmt::Arguments);

    /// An attribute nested one level below the previous attribute.
    fn subattr(&mut self, name: &str, value: fmt::Arguments);

    /// Opens a list attribute, optionally with a value on the same line.
    fn list_start(&mut self, name: &str, value: Option<fmt::Arguments>);

    /// One item of the currently open list.
    fn list_item(&mut self, item: fmt::Arguments);

    /// Closes the currently open list.
    fn list_end(&mut self);

    /// The blank line between structures.
    fn separator(&mut self);

    /// An error found while decoding the current structure.
    fn struct_err(&mut self, text: fmt::Arguments);
}

// Both sinks render through these functions so their output is identical.
fn render_comment(buf: &mut String, text: fmt::Arguments) {
    let _ = writeln!(buf, "# {}", text);
}

fn render_info(buf: &mut String, text: fmt::Arguments) {
    let _ = writeln!(buf, "{}", text);
}

fn render_handle(buf: &mut String, header: &Header) {
    let _ = writeln!(
        buf,
        "Handle 0x{:04X}, DMI type {}, {} bytes",
        header.handle, header.header_type, header.length
    );
}

fn render_handle_name(buf: &mut String, name: &str) {
    let _ = writeln!(buf, "{}", name);
}

fn render_attr(buf: &mut String, name: &str, value: fmt::Arguments) {
    let _ = writeln!(buf, "\t{}: {}", name, value);
}

fn render_subattr(buf: &mut String, name: &str, value: fmt::Arguments) {
    let _ = writeln!(buf, "\t\t{}: {}", name, value);
}

fn render_list_start(buf: &mut String, name: &str, value: Option<fmt::Arguments>) {
    let _ = match value {
        Some(value) => writeln!(buf, "\t{}: {}", name, value),
        None => writeln!(buf, "\t{}:", name),
    };
}

fn render_list_item(buf: &mut String, item: fmt::Arguments) {
    let _ = writeln!(buf, "\t\t{}", item);
}

fn render_struct_err(buf: &mut String, text: fmt::Arguments) {
    let _ = writeln!(buf, "\t{}", text);
}

/// Accumulates output into an in-memory string.
#[derive(Debug, Default)]
pub struct StringOutput {
    buf: String,
}

impl StringOutput {
    /// Creates an empty StringOutput.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the text accumulated so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consumes the sink and returns its text.
    pub fn into_string(self) -> String {
        self.buf
    }
}

impl Output for StringOutput {
    fn comment(&mut self, text: fmt::Arguments) {
        render_comment(&mut self.buf, text);
    }

    fn info(&mut self, text: fmt::Arguments) {
        render_info(&mut self.buf, text);
    }

    fn handle(&mut self, header: &Header) {
        render_handle(&mut self.buf, header);
    }

    fn handle_name(&mut self, name: &str) {
        render_handle_name(&mut self.buf, name);
    }

    fn attr(&mut self, name: &str, value: fmt::Arguments) {
        render_attr(&mut self.buf, name, value);
    }

    fn subattr(&mut self, name: &str, value: fmt::Arguments) {
        render_subattr(&mut self.buf, name, value);
    }

    fn list_start(&mut self, name: &str, value: Option<fmt::Arguments>) {
        render_list_start(&mut self.buf, name, value);
    }

    fn list_item(&mut self, item: fmt::Arguments) {
        render_list_item(&mut self.buf, item);
    }

    fn list_end(&mut self) {}

    fn separator(&mut self) {
        self.buf.push('\n');
    }

    fn struct_err(&mut self, text: fmt::Arguments) {
        render_struct_err(&mut self.buf, text);
    }
}

/// Streams output line by line to an io::Write.
///
/// Write errors do not interrupt decoding; the first one is kept and
/// returned by `finish`.
pub struct TextOutput<W: io::Write> {
    w: W,
    line: String,
    err: Option<io::Error>,
}

impl<W: io::Write> TextOutput<W> {
    /// Creates a TextOutput writing to `w`.
    pub fn new(w: W) -> Self {
        TextOutput {
            w,
            line: String::new(),
            err: None,
        }
    }

    /// Flushes the writer and reports the first write error, if any.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.err.take() {
            return Err(err);
        }

        self.w.flush()?;
        Ok(self.w)
    }

    fn emit<F: FnOnce(&mut String)>(&mut self, render: F) {
        if self.err.is_some() {
            return;
        }

        self.line.clear();
        render(&mut self.line);

        if let Err(err) = self.w.write_all(self.line.as_bytes()) {
            self.err = Some(err);
        }
    }
}

impl<W: io::Write> Output for TextOutput<W> {
    fn comment(&mut self, text: fmt::Arguments) {
        self.emit(|buf| render_comment(buf, text));
    }

    fn info(&mut self, text: fmt::Arguments) {
        self.emit(|buf| render_info(buf, text));
    }

    fn handle(&mut self, header: &Header) {
        self.emit(|buf| render_handle(buf, header));
    }

    fn handle_name(&mut self, name: &str) {
        self.emit(|buf| render_handle_name(buf, name));
    }

    fn attr(&mut self, name: &str, value: fmt::Arguments) {
        self.emit(|buf| render_attr(buf, name, value));
    }

    fn subattr(&mut self, name: &str, value: fmt::Arguments) {
        self.emit(|buf| render_subattr(buf, name, value));
    }

    fn list_start(&mut self, name: &str, value: Option<fmt::Arguments>) {
        self.emit(|buf| render_list_start(buf, name, value));
    }

    fn list_item(&mut self, item: fmt::Arguments) {
        self.emit(|buf| render_list_item(buf, item));
    }

    fn list_end(&mut self) {}

    fn separator(&mut self) {
        self.emit(|buf| buf.push('\n'));
    }

    fn struct_err(&mut self, text: fmt::Arguments) {
        self.emit(|buf| render_struct_err(buf, text));
    }
}
