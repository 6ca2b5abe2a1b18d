use super::classifier::ClassifierConfig;
use super::exposure::ExposureConfig;
use super::impact::ImpactConfig;
use super::policy::PolicyCatalog;
use super::underwriter::UnderwriterConfig;

/// Compiled-in decision tables for every pipeline stage.
///
/// Components receive their slice at construction and validate it there, so
/// tests can substitute any table without touching global state.
#[derive(Debug, Clone)]
pub struct UnderwritingTables {
    pub classifier: ClassifierConfig,
    pub underwriter: UnderwriterConfig,
    pub catalog: PolicyCatalog,
    pub exposure: ExposureConfig,
    pub impact: ImpactConfig,
}

impl UnderwritingTables {
    pub fn standard() -> Self {
        Self {
            classifier: ClassifierConfig::standard(),
            underwriter: UnderwriterConfig::standard(),
            catalog: PolicyCatalog::standard(),
            exposure: ExposureConfig::standard(),
            impact: ImpactConfig::default(),
        }
    }
}

impl Default for UnderwritingTables {
    fn default() -> Self {
        Self::standard()
    }
}
