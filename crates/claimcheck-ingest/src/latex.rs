//! Literal command matching over LaTeX sources.
//!
//! Only `\label`, the `\ref` family, `\includegraphics` and `\graphicspath`
//! are recognized; everything else is opaque text.

use regex::Regex;
use std::sync::OnceLock;

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\label\{([^}]+)\}").expect("label regex must compile"))
}

fn ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\(?:ref|eqref|cref|Cref|autoref)\*?\{([^}]+)\}")
            .expect("ref regex must compile")
    })
}

fn graphics_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\includegraphics\*?(?:\[[^\]]*\])?\{([^}]+)\}")
            .expect("graphics regex must compile")
    })
}

fn graphicspath_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\graphicspath\{((?:\s*\{[^}]*\})+)\s*\}")
            .expect("graphicspath regex must compile")
    })
}

fn braced_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("braced regex must compile"))
}

/// Drop everything after an unescaped `%` on each line.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| {
            let mut from = 0;
            while let Some(offset) = line[from..].find('%') {
                let at = from + offset;
                if at > 0 && line.as_bytes()[at - 1] == b'\\' {
                    from = at + 1;
                    continue;
                }
                return &line[..at];
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Commands found in one source file, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TexFacts {
    pub labels: Vec<String>,
    pub refs: Vec<String>,
    pub graphics: Vec<String>,
    pub graphics_paths: Vec<String>,
}

/// Scan comment-stripped text. `\ref{a,b}` contributes both keys.
pub fn scan_tex(text: &str) -> TexFacts {
    let text = strip_comments(text);
    let captured = |re: &Regex| -> Vec<String> {
        re.captures_iter(&text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    };

    let refs = captured(ref_re())
        .iter()
        .flat_map(|keys| keys.split(','))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    let graphics_paths = captured(graphicspath_re())
        .iter()
        .flat_map(|group| {
            braced_re()
                .captures_iter(group)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|dir| !dir.is_empty())
        .collect();

    TexFacts {
        labels: captured(label_re()),
        refs,
        graphics: captured(graphics_re()),
        graphics_paths,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unescaped_comments() {
        let text = "a 50\\% rate % note\n% whole line\nplain";
        assert_eq!(strip_comments(text), "a 50\\% rate \n\nplain");
    }

    #[test]
    fn collects_labels_refs_and_graphics() {
        let facts = scan_tex(
            r"\section{Intro}\label{sec:intro}
See \ref{Psi:main}, \eqref{eq:one} and \cref{Lk:a, Lk:b}.
% \ref{commented:out}
\autoref{sec:intro}
\graphicspath{{fig/}{ plots/ }}
\includegraphics[width=0.5\linewidth]{fig/budget.pdf}
\includegraphics{curve}
",
        );
        assert_eq!(facts.labels, vec!["sec:intro"]);
        assert_eq!(
            facts.refs,
            vec!["Psi:main", "eq:one", "Lk:a", "Lk:b", "sec:intro"]
        );
        assert_eq!(facts.graphics, vec!["fig/budget.pdf", "curve"]);
        assert_eq!(facts.graphics_paths, vec!["fig/", "plots/"]);
    }
}
