//! Line-oriented editing scripts.
//!
//! One step per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! select 6 11
//! bold
//! type Hello\nworld
//! link https://example.com docs
//! undo
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use quire_engine::{Alignment, BlockType, Command, Editor, ListKind, Mark, RawRange};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Select(RawRange),
    Run(Command),
    Undo,
    Redo,
    /// Read an image file and insert it.
    Image(PathBuf),
}

/// Parse a whole script. Errors name the offending line.
pub fn parse(script: &str) -> Result<Vec<(usize, Step)>> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            let number = index + 1;
            parse_line(line)
                .with_context(|| format!("line {number}: {}", line.trim()))
                .map(|step| (number, step))
        })
        .collect()
}

pub fn parse_line(line: &str) -> Result<Step> {
    let line = line.trim_start();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let step = match word {
        "select" => Step::Select(parse_range(rest)?),
        "type" => Step::Run(Command::InsertText(unescape(rest))),
        "enter" => Step::Run(Command::InsertParagraph),
        "break" => Step::Run(Command::InsertLineBreak),
        "backspace" => Step::Run(Command::DeleteBackward),
        "delete" => Step::Run(Command::DeleteForward),
        "paste" => Step::Run(Command::Paste(rest.to_string())),
        "bold" => Step::Run(Command::ToggleMark(Mark::Bold)),
        "italic" => Step::Run(Command::ToggleMark(Mark::Italic)),
        "underline" => Step::Run(Command::ToggleMark(Mark::Underline)),
        "paragraph" => Step::Run(Command::SetBlockType(BlockType::Paragraph)),
        "heading" => {
            let level: u8 = rest.parse().with_context(|| format!("bad heading level {rest:?}"))?;
            if !(1..=6).contains(&level) {
                bail!("heading level must be 1 to 6, got {level}");
            }
            Step::Run(Command::ToggleHeading(level))
        }
        "list" | "bullets" => Step::Run(Command::ToggleList(ListKind::Bullet)),
        "numbers" => Step::Run(Command::ToggleList(ListKind::Ordered)),
        "indent" => Step::Run(Command::IndentListItem),
        "outdent" => Step::Run(Command::OutdentListItem),
        "align" => Step::Run(Command::SetAlignment(
            Alignment::from_css(rest).ok_or_else(|| anyhow!("unknown alignment {rest:?}"))?,
        )),
        "link" => {
            let (url, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Step::Run(Command::InsertLink {
                url: url.to_string(),
                text: text.trim().to_string(),
            })
        }
        "unlink" => Step::Run(Command::RemoveLink),
        "image" => {
            if rest.is_empty() {
                bail!("image needs a file path");
            }
            Step::Image(PathBuf::from(rest))
        }
        "rule" => Step::Run(Command::InsertHorizontalRule),
        "clear" => Step::Run(Command::ClearFormatting),
        "undo" => Step::Undo,
        "redo" => Step::Redo,
        other => bail!("unknown command {other:?}"),
    };
    Ok(step)
}

/// `select 3` for a caret, `select 6 11` for a range.
fn parse_range(args: &str) -> Result<RawRange> {
    let offsets = args
        .split_whitespace()
        .map(|n| n.parse::<usize>().with_context(|| format!("bad offset {n:?}")))
        .collect::<Result<Vec<_>>>()?;
    match offsets.as_slice() {
        [at] => Ok(RawRange::caret(*at)),
        [anchor, focus] => Ok(RawRange::text(*anchor, *focus)),
        _ => bail!("select takes one or two offsets"),
    }
}

/// `\n` is a newline, `\\` a backslash.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some('n')) => {
                out.push('\n');
                chars.next();
            }
            ('\\', Some('\\')) => {
                out.push('\\');
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Replay `steps` against `editor`, stopping at the first rejected step.
pub fn run(editor: &mut Editor, steps: Vec<(usize, Step)>) -> Result<()> {
    for (line, step) in steps {
        match step {
            Step::Select(range) => {
                editor.select(range);
            }
            Step::Run(command) => {
                let name = command.name();
                let patch = editor
                    .execute(command)
                    .with_context(|| format!("line {line}: {name} failed"))?;
                log::debug!("line {line}: {name}, changed: {}", patch.changed);
            }
            Step::Undo => {
                if editor.undo().is_none() {
                    log::info!("line {line}: nothing to undo");
                }
            }
            Step::Redo => {
                if editor.redo().is_none() {
                    log::info!("line {line}: nothing to redo");
                }
            }
            Step::Image(path) => {
                editor
                    .insert_image_file(&path)
                    .with_context(|| format!("line {line}: inserting {}", path.display()))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_engine::EditorOptions;
    use rstest::rstest;

    #[rstest]
    #[case("bold", Step::Run(Command::ToggleMark(Mark::Bold)))]
    #[case("select 4", Step::Select(RawRange::caret(4)))]
    #[case("select  6   11", Step::Select(RawRange::text(6, 11)))]
    #[case("type a\\nb", Step::Run(Command::InsertText("a\nb".into())))]
    #[case("heading 2", Step::Run(Command::ToggleHeading(2)))]
    #[case("align center", Step::Run(Command::SetAlignment(Alignment::Center)))]
    #[case("numbers", Step::Run(Command::ToggleList(ListKind::Ordered)))]
    #[case("undo", Step::Undo)]
    #[case(
        "link https://a.example the docs",
        Step::Run(Command::InsertLink { url: "https://a.example".into(), text: "the docs".into() })
    )]
    #[case(
        "link https://a.example",
        Step::Run(Command::InsertLink { url: "https://a.example".into(), text: String::new() })
    )]
    fn parses_steps(#[case] line: &str, #[case] expected: Step) {
        assert_eq!(parse_line(line).unwrap(), expected);
    }

    #[rstest]
    #[case("shout")]
    #[case("select")]
    #[case("select a b")]
    #[case("heading 9")]
    #[case("align middle")]
    #[case("image")]
    fn rejects_bad_lines(#[case] line: &str) {
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse("bold\n\n# comment\nshout\n").unwrap_err();
        assert!(format!("{err:#}").starts_with("line 4: shout"));
    }

    #[test]
    fn replays_a_script() {
        let mut editor = Editor::new("<p>Hello world</p>", EditorOptions::default());
        let steps = parse("select 6 11\nbold\nselect 0 5\nitalic\nundo\n").unwrap();
        run(&mut editor, steps).unwrap();
        assert_eq!(editor.content(), "<p>Hello <b>world</b></p>");
    }

    #[test]
    fn rejected_commands_stop_the_script() {
        let mut editor = Editor::new("<p>Hello world</p>", EditorOptions::default());
        let steps = parse("select 0 5\nlink javascript:alert(1)\nbold\n").unwrap();
        let err = run(&mut editor, steps).unwrap_err();
        assert!(format!("{err:#}").contains("line 2: createLink failed"));
        assert_eq!(editor.content(), "<p>Hello world</p>");
    }
}
