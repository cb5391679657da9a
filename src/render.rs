// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell script rendering.
//!
//! Project a [`ConfigDocument`] into zsh run-control source text. Rendering is
//! a pure function of the document and the framework root. It never looks at
//! the filesystem or the catalog, and equal inputs always produce
//! byte-identical output.
//!
//! # Sections
//!
//! Sections are always emitted in the same order, each under its own banner:
//!
//! 1. `GLOBALS`: framework root export.
//! 2. `EXPORTS`: exported variables.
//! 3. `PATH`: entries appended to the shell path.
//! 4. `PRE SOURCE`: scripts sourced before the framework loads.
//! 5. `OMZ CONFIG`: active theme and framework options.
//! 6. `PLUGINS`: bundled plugins, then custom plugins, followed by the
//!    framework bootstrap. Custom plugins with `enabled: false` stay out of
//!    the list even though the document still declares them.
//! 7. `USER CONFIG`: user variables.
//! 8. `ALIASES`: shell aliases.
//! 9. `OPTIONS`: `setopt` and `unsetopt` lines.
//! 10. `POST SOURCE`: scripts sourced last.
//!
//! Empty sections still emit their banner.

use crate::config::ConfigDocument;

use std::path::Path;

const RULE: &str =
    "###############################################################################";

/// Render zsh run-control script.
pub fn zshrc(document: &ConfigDocument, framework: &Path) -> String {
    let mut script = Script::default();

    script.section("GLOBALS");
    script.line(format!("export ZSH=\"{}\"", framework.display()));

    script.section("EXPORTS");
    for (key, value) in &document.exports {
        script.line(format!("export {key}=\"{value}\""));
    }

    script.section("PATH");
    script.line("typeset -U path");
    if !document.paths.is_empty() {
        script.line("path+=(");
        for path in &document.paths {
            script.line(format!("  {path}"));
        }
        script.line(")");
    }

    script.section("PRE SOURCE");
    for source in &document.source.pre {
        script.line(source_if_present(source));
    }

    script.section("OMZ CONFIG");
    script.line(format!("ZSH_THEME=\"{}\"", document.theme));
    for (option, value) in &document.configs.framework_options {
        script.line(format!("{option}=\"{value}\""));
    }

    script.section("PLUGINS");
    script.line("plugins=(");
    script.line("  # OMZ");
    for bundled in &document.plugins.bundled {
        script.line(format!("  {bundled}"));
    }
    script.line("  # CUSTOM");
    for custom in document.plugins.custom.iter().filter(|spec| spec.enabled) {
        script.line(format!("  {}", custom.id));
    }
    script.line(")");
    script.line("");
    script.line("source $ZSH/oh-my-zsh.sh");

    script.section("USER CONFIG");
    for (key, value) in &document.configs.user {
        script.line(format!("export {key}=\"{value}\""));
    }

    script.section("ALIASES");
    for (alias, command) in &document.aliases {
        script.line(format!("alias {alias}=\"{command}\""));
    }

    script.section("OPTIONS");
    for (option, enabled) in &document.configs.shell_options {
        if *enabled {
            script.line(format!("setopt {option}"));
        } else {
            script.line(format!("unsetopt {option}"));
        }
    }

    script.section("POST SOURCE");
    for source in &document.source.post {
        script.line(source_if_present(source));
    }

    script.into_string()
}

fn source_if_present(script: &str) -> String {
    format!("[[ ! -f {script} ]] || source {script}")
}

#[derive(Debug, Default)]
struct Script {
    text: String,
}

impl Script {
    fn section(&mut self, title: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.line(RULE);
        self.line(format!("# {title}"));
        self.line("##");
    }

    fn line(&mut self, line: impl AsRef<str>) {
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    fn into_string(self) -> String {
        self.text
    }
}
