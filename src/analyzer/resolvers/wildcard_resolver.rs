use crate::{
    analyzer::{AnalysisContext, AnalyzerError, ColumnEntry, ColumnResolver, Scope},
    syntax::Region,
};

pub struct WildcardResolver;

impl WildcardResolver {
    /// Expands `*` or `q.*` to the exported columns it stands for, in
    /// relation order.
    pub fn expand<'s>(
        ctx: &mut AnalysisContext,
        scope: &'s Scope,
        qualifier: Option<&str>,
        region: Region,
    ) -> Result<Vec<&'s ColumnEntry>, AnalyzerError> {
        match qualifier {
            Some(qualifier) => {
                let (_, relation) = ColumnResolver::relation(ctx, scope, qualifier, region)?;
                Ok(relation.exported().collect())
            }
            None => Ok(scope.references().iter().flat_map(|relation| relation.exported()).collect()),
        }
    }
}
