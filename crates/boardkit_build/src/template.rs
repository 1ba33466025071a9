//! A small placeholder renderer for command lines and toolchain files.
//!
//! Placeholders are written `{{...}}`:
//!
//! | placeholder        | expands to                                         |
//! |--------------------|----------------------------------------------------|
//! | `{{name}}`         | the build name                                     |
//! | `{{<var>}}`        | a platform variable (`device`, `package`, `speed`, `top`, ...) |
//! | `{{tool X}}`       | the tool name `X`, located at execution time       |
//! | `{{opts KEY}}`     | the override `KEY`, or nothing when unset          |
//! | `{{verbose TEXT}}` | `TEXT` when the build is verbose                   |
//! | `{{quiet TEXT}}`   | `TEXT` when the build is not verbose               |
//! | `{{artifact N}}`   | the path of the `N`th extracted artifact           |
//!
//! Rendering is pure string substitution and is evaluated fresh for every
//! build; nothing is cached.

use indexmap::IndexMap;

use crate::error::TemplateError;

/// Everything a template may refer to.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// The build name.
    pub name: &'a str,
    /// Named variables.
    pub vars: &'a IndexMap<String, String>,
    /// Toolchain option overrides.
    pub overrides: &'a IndexMap<String, String>,
    /// Whether the build is verbose.
    pub verbose: bool,
    /// Paths of extracted artifacts, for programmer arguments.
    pub artifacts: &'a [String],
}

impl<'a> TemplateContext<'a> {
    /// A context with only a build name and variables.
    pub fn new(name: &'a str, vars: &'a IndexMap<String, String>) -> Self {
        Self {
            name,
            vars,
            overrides: empty(),
            verbose: false,
            artifacts: &[],
        }
    }

    /// Sets the option overrides.
    pub fn with_overrides(mut self, overrides: &'a IndexMap<String, String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets verbosity.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the extracted artifact paths.
    pub fn with_artifacts(mut self, artifacts: &'a [String]) -> Self {
        self.artifacts = artifacts;
        self
    }

    fn expand(&self, placeholder: &str) -> Result<String, TemplateError> {
        let unknown = || TemplateError::UnknownPlaceholder {
            placeholder: placeholder.to_string(),
        };
        let (head, arg) = match placeholder.split_once(char::is_whitespace) {
            Some((head, arg)) => (head, Some(arg.trim())),
            None => (placeholder, None),
        };
        match (head, arg) {
            ("name", None) => Ok(self.name.to_string()),
            ("tool", Some(tool)) => Ok(tool.to_string()),
            ("opts", Some(key)) => Ok(self.overrides.get(key).cloned().unwrap_or_default()),
            ("verbose", Some(text)) => Ok(if self.verbose { text.to_string() } else { String::new() }),
            ("quiet", Some(text)) => Ok(if self.verbose { String::new() } else { text.to_string() }),
            ("artifact", Some(index)) => {
                let index: usize = index.parse().map_err(|_| unknown())?;
                self.artifacts
                    .get(index)
                    .cloned()
                    .ok_or(TemplateError::ArtifactIndex {
                        index,
                        count: self.artifacts.len(),
                    })
            }
            (var, None) => self.vars.get(var).cloned().ok_or_else(unknown),
            _ => Err(unknown()),
        }
    }
}

fn empty() -> &'static IndexMap<String, String> {
    static EMPTY: std::sync::OnceLock<IndexMap<String, String>> = std::sync::OnceLock::new();
    EMPTY.get_or_init(IndexMap::new)
}

/// Substitutes every placeholder in `template`.
pub fn render(template: &str, ctx: &TemplateContext<'_>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find("}}").ok_or(TemplateError::Unterminated {
            offset: offset + start,
        })?;
        out.push_str(&ctx.expand(after[..end].trim())?);
        let consumed = start + 2 + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Splits a rendered command line into arguments.
///
/// Arguments are separated by any whitespace, newlines included. A double
/// quoted span is kept as part of one argument with the quotes removed.
pub fn split_args(line: &str) -> Result<Vec<String>, TemplateError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if quoted {
        return Err(TemplateError::UnbalancedQuote {
            line: line.trim().to_string(),
        });
    }
    if in_arg {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> IndexMap<String, String> {
        [("device", "LFE5U-25F"), ("speed", "8")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn name_vars_and_tools() {
        let vars = vars();
        let ctx = TemplateContext::new("top", &vars);
        assert_eq!(
            render("{{tool yosys}} -l {{name}}.rpt --speed {{ speed }}", &ctx).unwrap(),
            "yosys -l top.rpt --speed 8"
        );
    }

    #[test]
    fn opts_default_to_empty() {
        let vars = vars();
        let overrides: IndexMap<String, String> =
            [("ecppack_opts".to_string(), "--compress".to_string())].into_iter().collect();
        let ctx = TemplateContext::new("top", &vars).with_overrides(&overrides);
        assert_eq!(
            render("ecppack {{opts ecppack_opts}} {{opts nextpnr_opts}}x", &ctx).unwrap(),
            "ecppack --compress x"
        );
    }

    #[test]
    fn verbosity_switches() {
        let vars = vars();
        let quiet = TemplateContext::new("top", &vars);
        let loud = quiet.with_verbose(true);
        let tpl = "{{quiet -q}}|{{verbose --verbose}}";
        assert_eq!(render(tpl, &quiet).unwrap(), "-q|");
        assert_eq!(render(tpl, &loud).unwrap(), "|--verbose");
    }

    #[test]
    fn artifacts() {
        let vars = vars();
        let paths = vec!["/tmp/x/top.bit".to_string()];
        let ctx = TemplateContext::new("top", &vars).with_artifacts(&paths);
        assert_eq!(render("-D {{artifact 0}}", &ctx).unwrap(), "-D /tmp/x/top.bit");
        assert_eq!(
            render("{{artifact 1}}", &ctx).unwrap_err(),
            TemplateError::ArtifactIndex { index: 1, count: 1 }
        );
    }

    #[test]
    fn errors() {
        let vars = vars();
        let ctx = TemplateContext::new("top", &vars);
        assert_eq!(
            render("a {{name", &ctx).unwrap_err(),
            TemplateError::Unterminated { offset: 2 }
        );
        assert_eq!(
            render("{{bogus}}", &ctx).unwrap_err(),
            TemplateError::UnknownPlaceholder {
                placeholder: "bogus".to_string()
            }
        );
        assert!(render("{{tool}}", &ctx).is_err());
    }

    #[test]
    fn rendering_is_fresh_per_name() {
        let vars = vars();
        let tpl = "{{name}}.bit";
        assert_eq!(render(tpl, &TemplateContext::new("a", &vars)).unwrap(), "a.bit");
        assert_eq!(render(tpl, &TemplateContext::new("b", &vars)).unwrap(), "b.bit");
    }

    #[test]
    fn split_handles_quotes_and_newlines() {
        let args = split_args(
            "openocd -f cfg\n   -c \"transport select jtag; init; exit\"  ",
        )
        .unwrap();
        assert_eq!(
            args,
            vec!["openocd", "-f", "cfg", "-c", "transport select jtag; init; exit"]
        );
        assert_eq!(split_args("a \"\" b").unwrap(), vec!["a", "", "b"]);
        assert!(split_args("a \"b").is_err());
    }
}
