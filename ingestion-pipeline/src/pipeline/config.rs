use common::utils::config::AppConfig;

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub group_name_prefix: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            group_name_prefix: "knowledge_base".to_string(),
        }
    }
}

impl IngestionConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            group_name_prefix: config.group_name_prefix.clone(),
        }
    }

    /// Name given to the group rebuilt over `total_files` files.
    pub fn group_name(&self, total_files: usize) -> String {
        format!("{}_{total_files}_files", self.group_name_prefix)
    }
}
