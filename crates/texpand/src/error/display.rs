use crate::error;
use crate::vm::source::Location;
use colored::*;

pub fn format_error(f: &mut std::fmt::Formatter<'_>, err: &error::Error) -> std::fmt::Result {
    writeln!(
        f,
        "{}: {}",
        "Error".bright_red().bold(),
        err.kind.to_string().bold()
    )?;
    let margin = match &err.location {
        None => 2,
        Some(location) => location.line.to_string().len() + 1,
    };
    let printer = Printer { margin };
    if let Some(location) = &err.location {
        fmt_location(&printer, f, location)?;
    }
    for note in &err.notes {
        let mut lines = note.trim_end().lines();
        let first = match lines.next() {
            None => continue,
            Some(first) => first,
        };
        printer.line(f, '=', &format!["{} {}", "note:".bold(), first])?;
        for line in lines {
            printer.line(f, ' ', &format!["      {line}"])?;
        }
    }
    if !err.stack_trace.is_empty() {
        printer.line(
            f,
            '=',
            &format!["{} this error occurred while expanding:", "note:".bold()],
        )?;
        for (i, name) in err.stack_trace.iter().rev().enumerate() {
            printer.line(
                f,
                ' ',
                &format!["      {}. {}", i + 1, format!["\\{name}"].yellow()],
            )?;
        }
    }
    Ok(())
}

struct Printer {
    margin: usize,
}

impl Printer {
    fn line(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        separator: char,
        content: &str,
    ) -> std::fmt::Result {
        self.line_with_margin(f, "", separator, content)
    }

    fn line_with_margin(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        margin_content: &str,
        separator: char,
        content: &str,
    ) -> std::fmt::Result {
        let indent = self.margin.saturating_sub(margin_content.len() + 1);
        write!(
            f,
            "{}{} {}",
            " ".repeat(indent),
            margin_content.bright_cyan(),
            separator.to_string().bright_cyan(),
        )?;
        if content.is_empty() {
            writeln!(f)
        } else {
            writeln!(f, " {content}")
        }
    }
}

fn fmt_location(
    printer: &Printer,
    f: &mut std::fmt::Formatter<'_>,
    location: &Location,
) -> std::fmt::Result {
    writeln!(
        f,
        "{}{} {}:{}:{}",
        " ".repeat(printer.margin.saturating_sub(1)),
        ">>>".bright_cyan().bold(),
        location.name,
        location.line,
        location.column
    )?;
    printer.line(f, '|', "")?;
    printer.line_with_margin(
        f,
        &location.line.to_string(),
        '|',
        location.line_content.trim_end(),
    )?;
    let caret_offset = location.column.saturating_sub(1);
    printer.line(
        f,
        '|',
        &format![
            "{}{}",
            " ".repeat(caret_offset),
            "^".bright_red().bold()
        ],
    )
}
