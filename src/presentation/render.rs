//! 终端渲染：把 [`View`] 输出为带 ANSI 配色的文本。

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::acquisition::preview;
use crate::theme::Theme;

use super::{FOOTER, OPEN_LINK_LABEL, View, visible_lines};

/// 一套 ANSI 配色；`plain()` 关闭所有转义序列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    title: &'static str,
    accent: &'static str,
    success: &'static str,
    error: &'static str,
    muted: &'static str,
    code: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                title: "\x1b[1;30m",
                accent: "\x1b[34m",
                success: "\x1b[32m",
                error: "\x1b[31m",
                muted: "\x1b[90m",
                code: "\x1b[47;30m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Self {
                title: "\x1b[1;97m",
                accent: "\x1b[94m",
                success: "\x1b[92m",
                error: "\x1b[91m",
                muted: "\x1b[37m",
                code: "\x1b[100;97m",
                reset: "\x1b[0m",
            },
        }
    }

    pub fn plain() -> Self {
        Self {
            title: "",
            accent: "",
            success: "",
            error: "",
            muted: "",
            code: "",
            reset: "",
        }
    }
}

pub struct Renderer {
    palette: Palette,
    max_visible_lines: usize,
}

impl Renderer {
    pub fn new(palette: Palette, max_visible_lines: usize) -> Self {
        Self {
            palette,
            max_visible_lines: max_visible_lines.max(1),
        }
    }

    pub fn render(&self, view: &View) -> String {
        let p = &self.palette;
        let mut out = String::new();

        match view {
            View::Idle {
                headline,
                hint,
                upload_label,
            } => {
                let _ = writeln!(out, "{}{}{}", p.title, headline, p.reset);
                let _ = writeln!(out, "{}{}{}", p.muted, hint, p.reset);
                let _ = writeln!(out, "[{}{}{}]", p.accent, upload_label, p.reset);
            }
            View::Scanning {
                preview: uri,
                label,
            } => {
                match uri.as_deref().and_then(preview::describe) {
                    Some((mime, size)) => {
                        let _ = writeln!(out, "{}Preview: {} ({} bytes){}", p.muted, mime, size, p.reset);
                    }
                    None => {
                        let _ = writeln!(out, "{}Preparing preview{}", p.muted, p.reset);
                    }
                }
                let _ = writeln!(out, "{}{}{}", p.accent, label, p.reset);
            }
            View::Success {
                title,
                payload,
                copy_label,
                copied,
                open_link,
                reset_label,
            } => {
                let _ = writeln!(out, "{}{}{}", p.title, title, p.reset);

                let (lines, hidden) = visible_lines(payload, self.max_visible_lines);
                for line in lines {
                    let _ = writeln!(out, "  {}{}{}", p.code, escape_controls(line), p.reset);
                }
                if hidden > 0 {
                    let _ = writeln!(out, "  {}… {} more lines{}", p.muted, hidden, p.reset);
                }

                let copy_color = if *copied { p.success } else { p.accent };
                let _ = write!(out, "[{}{}{}]", copy_color, copy_label, p.reset);
                if open_link.is_some() {
                    let _ = write!(out, " [{}{}{}]", p.accent, OPEN_LINK_LABEL, p.reset);
                }
                let _ = writeln!(out, " [{}{}{}]", p.accent, reset_label, p.reset);
            }
            View::Error {
                title,
                message,
                reset_label,
            } => {
                let _ = writeln!(out, "{}{}{}", p.error, title, p.reset);
                let _ = writeln!(out, "{}", message);
                let _ = writeln!(out, "[{}{}{}]", p.accent, reset_label, p.reset);
            }
        }

        let _ = writeln!(out, "{}{}{}", p.muted, FOOTER, p.reset);
        out
    }
}

/// 结果来自不可信图片：控制字符按字面转义后再输出到终端。
fn escape_controls(line: &str) -> Cow<'_, str> {
    if !line.chars().any(char::is_control) {
        return Cow::Borrowed(line);
    }
    let mut escaped = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{COPIED_LABEL, COPY_LABEL, SCAN_AGAIN_LABEL};

    fn success(payload: &str, copied: bool, open_link: Option<String>) -> View {
        View::Success {
            title: "Scan Result",
            payload: payload.to_string(),
            copy_label: if copied { COPIED_LABEL } else { COPY_LABEL },
            copied,
            open_link,
            reset_label: SCAN_AGAIN_LABEL,
        }
    }

    #[test]
    fn plain_palette_has_no_escapes() {
        let text = Renderer::new(Palette::plain(), 12).render(&success("hello", false, None));
        assert!(!text.contains('\x1b'));
        assert!(text.contains("  hello\n"));
        assert!(text.contains("[Copy result]"));
        assert!(!text.contains(OPEN_LINK_LABEL));
        assert!(text.ends_with(&format!("{}\n", FOOTER)));
    }

    #[test]
    fn control_characters_in_payload_are_escaped() {
        let payload = "safe\x1b]52;c;ZXZpbA==\x07\x1b[2J\rtail";
        for palette in [Palette::plain(), Palette::for_theme(Theme::Dark)] {
            let text = Renderer::new(palette, 12).render(&success(payload, false, None));
            let body = text.lines().nth(1).expect("payload line");
            assert!(!body.contains('\x07'));
            assert!(!body.contains('\r'));
            assert!(!body.contains("\x1b]52"));
            assert!(!body.contains("\x1b[2J"));
        }

        let plain = Renderer::new(Palette::plain(), 12).render(&success(payload, false, None));
        assert!(!plain.contains('\x1b'));
        assert!(plain.contains(r"safe\u{1b}]52;c;ZXZpbA==\u{7}\u{1b}[2J\rtail"));
    }

    #[test]
    fn escape_keeps_printable_text_borrowed() {
        assert!(matches!(escape_controls("héllo 世界"), Cow::Borrowed("héllo 世界")));
        assert_eq!(escape_controls("a\tb"), "a\\tb");
    }

    #[test]
    fn link_action_appears_for_urls() {
        let view = success("https://example.com", true, Some("https://example.com".to_string()));
        let text = Renderer::new(Palette::plain(), 12).render(&view);
        assert!(text.contains("[Copied] [Open link] [Scan new code]"));
    }

    #[test]
    fn long_payload_is_clipped_with_marker() {
        let payload = (0..20).map(|n| format!("line {n}")).collect::<Vec<_>>().join("\n");
        let text = Renderer::new(Palette::plain(), 5).render(&success(&payload, false, None));
        assert!(text.contains("line 4"));
        assert!(!text.contains("line 5\n"));
        assert!(text.contains("… 15 more lines"));
    }

    #[test]
    fn scanning_describes_preview() {
        let view = View::Scanning {
            preview: Some("data:image/png;base64,AQID".to_string()),
            label: "Scanning...",
        };
        let text = Renderer::new(Palette::plain(), 12).render(&view);
        assert!(text.contains("Preview: image/png (3 bytes)"));
        assert!(text.contains("Scanning..."));
    }

    #[test]
    fn themes_use_different_palettes() {
        assert_ne!(Palette::for_theme(Theme::Light), Palette::for_theme(Theme::Dark));
        let text = Renderer::new(Palette::for_theme(Theme::Dark), 12).render(&success("x", false, None));
        assert!(text.contains("\x1b[0m"));
    }
}
