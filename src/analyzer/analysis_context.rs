use tracing::warn;

use crate::{
    analyzer::{AnalyzedQuery, AnalyzerConfig, AnalyzerError, Diagnostic, DiagnosticCode, QueryAnalyzer, Severity},
    catalog::Catalog,
    planner::{Descriptor, DescriptorFactory, OperatorGraph},
    syntax::{QueryExpr, Region},
};

/// Everything one analysis session shares: the catalog, the limits, the
/// diagnostics channel, the descriptor factory and the operator graph
/// under construction.
pub struct AnalysisContext<'a> {
    pub catalog: &'a dyn Catalog,
    pub config: AnalyzerConfig,
    pub graph: OperatorGraph,
    diagnostics: Vec<Diagnostic>,
    descriptors: DescriptorFactory,
    depth: usize,
    expression_depth: usize,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self::with_config(catalog, AnalyzerConfig::default())
    }

    pub fn with_config(catalog: &'a dyn Catalog, config: AnalyzerConfig) -> Self {
        Self {
            catalog,
            config,
            graph: OperatorGraph::new(),
            diagnostics: Vec::new(),
            descriptors: DescriptorFactory::new(),
            depth: 0,
            expression_depth: 0,
        }
    }

    /// Analyzes one statement. Diagnostics of earlier statements are kept.
    pub fn analyze_query(&mut self, query: &QueryExpr) -> Result<AnalyzedQuery, AnalyzerError> {
        QueryAnalyzer::analyze(self, query)
    }

    /// Records an error and returns it for propagation.
    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>, region: Region) -> AnalyzerError {
        let message = message.into();
        warn!(%code, %region, "{}", message);
        let diagnostic = Diagnostic { code, severity: Severity::Error, message, region };
        let err = AnalyzerError::from(&diagnostic);
        self.diagnostics.push(diagnostic);
        err
    }

    /// Records a problem that does not stop the analysis.
    pub fn warn(&mut self, code: DiagnosticCode, message: impl Into<String>, region: Region) {
        let message = message.into();
        warn!(%code, %region, "{}", message);
        self.diagnostics.push(Diagnostic { code, severity: Severity::Warning, message, region });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn fresh_descriptor(&mut self) -> Descriptor {
        self.descriptors.fresh()
    }

    /// Fails with `exceed_number_of_elements` when `count` is above `limit`.
    pub fn check_limit(&mut self, what: &str, count: usize, limit: usize, region: Region) -> Result<(), AnalyzerError> {
        if count > limit {
            return Err(self.report(
                DiagnosticCode::ExceedNumberOfElements,
                format!("too many {} ({} > {})", what, count, limit),
                region,
            ));
        }
        Ok(())
    }

    /// Enters one level of query or table-expression nesting. Pair with
    /// [`Self::leave`].
    pub fn enter(&mut self, region: Region) -> Result<(), AnalyzerError> {
        self.depth += 1;
        let limit = self.config.max_nesting_depth;
        self.check_limit("nested query expressions", self.depth, limit, region)
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enters one scalar expression node. Pair with [`Self::leave_expression`].
    pub fn enter_expression(&mut self, region: Region) -> Result<(), AnalyzerError> {
        self.expression_depth += 1;
        let limit = self.config.max_expression_depth;
        self.check_limit("nested scalar expressions", self.expression_depth, limit, region)
    }

    pub fn leave_expression(&mut self) {
        self.expression_depth = self.expression_depth.saturating_sub(1);
    }

    pub(crate) fn reset_depth(&mut self) {
        self.depth = 0;
        self.expression_depth = 0;
    }
}
