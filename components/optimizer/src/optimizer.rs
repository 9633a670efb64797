//! Pass pipeline
//!
//! Runs hoisting, scope analysis, constant folding and minification over a
//! parsed program, in that order.

use core_types::JsError;
use parser::{Node, ScopeAnalysis};
use tracing::debug;

use crate::fold::ConstantFold;
use crate::hoist::HoistPass;
use crate::minify::MinifyPass;
use crate::printer::print;

/// Counters reported by one [`Optimizer::optimize`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    /// Names gathered into leading `var` declarations
    pub hoisted: usize,
    /// Rewrites made by constant folding, over all passes
    pub folded: usize,
    /// Fold passes actually run
    pub fold_passes: usize,
    /// Symbols given a shorter name
    pub renamed: usize,
}

/// Syntax tree optimizer that applies the pass pipeline
#[derive(Debug, Clone)]
pub struct Optimizer {
    /// Maximum number of constant folding passes to run
    max_passes: usize,
    hoist: bool,
    fold: bool,
    mangle: bool,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// Create an optimizer with every pass enabled
    pub fn new() -> Self {
        Self {
            max_passes: 2,
            hoist: true,
            fold: true,
            mangle: true,
        }
    }

    /// Set maximum number of constant folding passes
    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = max;
        self
    }

    /// Enable or disable declaration hoisting
    pub fn with_hoist(mut self, hoist: bool) -> Self {
        self.hoist = hoist;
        self
    }

    /// Enable or disable constant folding and dead code removal
    pub fn with_fold(mut self, fold: bool) -> Self {
        self.fold = fold;
        self
    }

    /// Enable or disable local renaming
    pub fn with_mangle(mut self, mangle: bool) -> Self {
        self.mangle = mangle;
        self
    }

    /// Run all passes on `program`
    pub fn optimize(&self, program: &mut Node) -> Result<OptimizeStats, JsError> {
        let mut stats = OptimizeStats::default();

        if self.hoist {
            stats.hoisted = HoistPass::run(program)?;
        }

        let mut tree = ScopeAnalysis::analyze(program)?;

        if self.fold {
            let mut size = usize::MAX;
            for _ in 0..self.max_passes {
                let folded = ConstantFold::run(program, &tree)?;
                stats.folded += folded;
                stats.fold_passes += 1;
                let printed = print(program)?.len();
                if folded == 0 || printed >= size {
                    break;
                }
                size = printed;
            }
            // folding drops references and adds declarations
            tree = ScopeAnalysis::analyze(program)?;
        }

        stats.renamed = MinifyPass::run(program, &mut tree, self.mangle)?;

        debug!(
            hoisted = stats.hoisted,
            folded = stats.folded,
            fold_passes = stats.fold_passes,
            renamed = stats.renamed,
            "optimization complete"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::parse_script;

    fn optimized(source: &str, optimizer: &Optimizer) -> String {
        let mut program = parse_script(source).unwrap();
        optimizer.optimize(&mut program).unwrap();
        print(&program).unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        let code = optimized(
            "function add(first, second) { var total = first + second; return total; }",
            &Optimizer::new(),
        );
        assert_eq!(code, "function add(_,$){var a;a=_+$;return a}");
    }

    #[test]
    fn test_passes_can_be_disabled() {
        let source = "function f(x) { if (1) { g(x); } }";
        let optimizer = Optimizer::new().with_fold(false).with_mangle(false).with_hoist(false);
        assert_eq!(optimized(source, &optimizer), "function f(x){1&&g(x)}");
        assert_eq!(optimized(source, &Optimizer::new()), "function f(_){g(_)}");
    }

    #[test]
    fn test_fold_passes_bounded() {
        let mut program = parse_script("x = 1 + 2;").unwrap();
        let stats = Optimizer::new().with_max_passes(5).optimize(&mut program).unwrap();
        assert!(stats.fold_passes <= 5);
        assert!(stats.folded >= 1);
    }

    #[test]
    fn test_dead_var_stays_declared_and_renamed() {
        let code = optimized(
            "function f() { return g(); var late = 1; }",
            &Optimizer::new().with_hoist(false),
        );
        assert_eq!(code, "function f(){return g();var _}");
    }
}
