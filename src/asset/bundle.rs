//! ES module bundling through an external bundler.
//!
//! The default [`CommandBundler`] drives an esbuild-compatible CLI:
//!
//! ```text
//! esbuild <input> --bundle --outfile=<output> --format=esm --target=es2018 [--sourcemap] [--minify]
//! ```

use std::path::Path;

use crate::utils::exec::{Cmd, FilterRule};

/// One bundling job: a single entry module to a single browser bundle.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub target: &'a str,
    pub format: &'a str,
    pub sourcemap: bool,
    pub minify: bool,
}

/// Module-bundler service. The output file exists once this returns `Ok`.
pub trait ModuleBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<(), String>;
}

/// Skip esbuild's progress and size summary lines.
static BUNDLER_FILTER: FilterRule = FilterRule::new(&["dist/", "⚡", "Done in", "[watch]"]);

/// Runs a configured bundler command (e.g. `["esbuild"]` or `["npx", "esbuild"]`).
#[derive(Debug, Clone)]
pub struct CommandBundler {
    command: Vec<String>,
}

impl CommandBundler {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Resolve the program on PATH so a missing bundler reads clearly.
    fn program(&self) -> Result<Vec<String>, String> {
        let Some((program, rest)) = self.command.split_first() else {
            return Err("bundler command is empty".to_string());
        };
        let resolved = which::which(program)
            .map_err(|_| format!("`{program}` not found in PATH"))?;

        let mut command = vec![resolved.to_string_lossy().into_owned()];
        command.extend(rest.iter().cloned());
        Ok(command)
    }
}

impl Default for CommandBundler {
    fn default() -> Self {
        Self::new(vec!["esbuild".to_string()])
    }
}

impl ModuleBundler for CommandBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<(), String> {
        let command = self.program()?;
        let cwd = request.input.parent().unwrap_or(Path::new("."));

        Cmd::from_slice(&command)
            .arg(request.input)
            .arg("--bundle")
            .arg(format!("--outfile={}", request.output.display()))
            .arg(format!("--format={}", request.format))
            .arg(format!("--target={}", request.target))
            .arg(if request.sourcemap { "--sourcemap" } else { "" })
            .arg(if request.minify { "--minify" } else { "" })
            .cwd(cwd)
            .filter(&BUNDLER_FILTER)
            .run()
            .map_err(|e| format!("{e:#}"))?;

        if request.output.is_file() {
            Ok(())
        } else {
            Err(format!("no output at {}", request.output.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let bundler = CommandBundler::new(vec!["to-build-no-such-bundler".into()]);
        let err = bundler
            .bundle(&BundleRequest {
                input: Path::new("main.js"),
                output: Path::new("out.js"),
                target: "es2018",
                format: "esm",
                sourcemap: false,
                minify: false,
            })
            .unwrap_err();
        assert!(err.contains("not found in PATH"));
    }

    #[test]
    fn test_empty_command() {
        let bundler = CommandBundler::new(Vec::new());
        assert!(bundler.program().is_err());
    }
}
