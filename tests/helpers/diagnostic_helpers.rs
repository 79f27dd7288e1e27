//! Compilation and diagnostic assertion helpers.

use trialdsl::{Compiler, CompilerOptions, DefType, Diagnostic, DiagnosticKind};

/// Compile `files` in a single batch.
pub fn compile(files: &[(&str, &str)]) -> Compiler {
    let mut compiler = Compiler::new(CompilerOptions::default());
    compiler.update_files(files.iter().map(|(name, source)| (*name, Some(*source))));
    compiler
}

pub fn codes(compiler: &Compiler) -> Vec<&'static str> {
    compiler.diagnostics().iter().map(Diagnostic::code).collect()
}

/// `not_found` diagnostics for the given definition.
pub fn not_found(compiler: &Compiler, def_type: DefType, name: &str) -> Vec<Diagnostic> {
    compiler
        .diagnostics()
        .into_iter()
        .filter(|d| {
            matches!(
                &d.kind,
                DiagnosticKind::NotFound { def_type: t, name: n, .. } if *t == def_type && n == name
            )
        })
        .collect()
}

/// Assert a compiler has no diagnostics.
pub fn assert_no_diagnostics(compiler: &Compiler) {
    let diagnostics = compiler.diagnostics();
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got {}:\n{}",
        diagnostics.len(),
        diagnostics
            .iter()
            .map(|d| format!("  {d}"))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_empty_batch_reports_missing_study() {
        assert_eq!(codes(&compile(&[])), ["missing_study_def"]);
    }
}
