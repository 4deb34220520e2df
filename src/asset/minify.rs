//! Asset minification for JS and CSS files.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both can emit a source
//! map whose single source entry is the uncompressed twin written beside the
//! minified file.

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use parcel_sourcemap::SourceMap;

/// Minifier output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minified {
    pub code: String,
    /// Source map JSON, when requested and produced.
    pub map: Option<String>,
}

/// Minifier service.
///
/// `source_name` is recorded as the map's source entry. Errors are the
/// minifier's own message.
pub trait Minifier {
    fn minify_css(&self, source: &str, source_name: &str, sourcemap: bool)
    -> Result<Minified, String>;

    fn minify_js(&self, source: &str, source_name: &str, sourcemap: bool)
    -> Result<Minified, String>;
}

/// In-process minifier backed by oxc and lightningcss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMinifier;

impl Minifier for NativeMinifier {
    fn minify_css(
        &self,
        source: &str,
        source_name: &str,
        sourcemap: bool,
    ) -> Result<Minified, String> {
        let options = ParserOptions {
            filename: source_name.to_string(),
            ..ParserOptions::default()
        };
        let mut stylesheet = StyleSheet::parse(source, options).map_err(|e| e.to_string())?;
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| e.to_string())?;

        let mut map = sourcemap.then(|| {
            let mut map = SourceMap::new("/");
            let index = map.add_source(source_name);
            map.set_source_content(index as usize, source).ok();
            map
        });

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                source_map: map.as_mut(),
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;

        let map = match map.as_mut() {
            Some(map) => Some(map.to_json(None).map_err(|e| e.to_string())?),
            None => None,
        };
        Ok(Minified {
            code: result.code,
            map,
        })
    }

    fn minify_js(
        &self,
        source: &str,
        source_name: &str,
        sourcemap: bool,
    ) -> Result<Minified, String> {
        let allocator = Allocator::default();
        // Classic scripts: no import/export, top-level bindings stay global.
        let source_type = SourceType::cjs();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if let Some(error) = ret.errors.first() {
            return Err(error.to_string());
        }

        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
        let output = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                source_map_path: sourcemap.then(|| source_name.into()),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program);

        Ok(Minified {
            code: output.code,
            map: output.map.map(|map| map.to_json_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_css() {
        let out = NativeMinifier
            .minify_css("a {\n  color: #ff0000;\n}\n", "a.css", false)
            .unwrap();
        assert_eq!(out.code, "a{color:red}");
        assert!(out.map.is_none());
    }

    #[test]
    fn test_minify_css_with_map() {
        let out = NativeMinifier
            .minify_css("body {\n  margin: 0;\n}\n", "main.css", true)
            .unwrap();
        let map = out.map.unwrap();
        assert!(map.contains("main.css"));
        assert!(map.contains("\"mappings\""));
    }

    #[test]
    fn test_minify_js() {
        let out = NativeMinifier
            .minify_js("var answer = 40 + 2;\nconsole.log( answer );\n", "b.js", false)
            .unwrap();
        assert!(out.code.len() < 40);
        assert!(out.code.contains("console.log"));
    }

    #[test]
    fn test_minify_js_with_map() {
        let out = NativeMinifier
            .minify_js("function hello() { return 1; }\nhello();\n", "b.js", true)
            .unwrap();
        let map = out.map.unwrap();
        assert!(map.contains("b.js"));
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert!(NativeMinifier.minify_js("function (", "b.js", false).is_err());
    }
}
