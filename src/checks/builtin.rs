//! Built-in command group definitions.
//!
//! These groups are used when no `stackcheck.toml` overrides them.

use crate::config::{EnabledCondition, GroupConfig};
use crate::core::resolver::Role;

/// Names of built-in command groups.
pub mod names {
    /// Format the API with Laravel Pint.
    pub const API_LINT: &str = "api-lint";
    /// Apply Rector refactorings to the API.
    pub const API_REFACTOR: &str = "api-refactor";
    /// Run PHPStan over the API.
    pub const API_ANALYSE: &str = "api-analyse";
    /// Run the API test suite with Pest.
    pub const API_TEST: &str = "api-test";
    /// Run the frontend lint script.
    pub const FRONTEND_LINT: &str = "frontend-lint";
    /// Run the frontend test script.
    pub const FRONTEND_TEST: &str = "frontend-test";
}

/// Default command groups: API lint before test, then frontend lint before test.
#[must_use]
pub fn default_groups() -> Vec<GroupConfig> {
    vec![
        GroupConfig::new(names::API_LINT, Role::Api, "vendor/bin/pint")
            .description("Format PHP code with Pint")
            .enabled_if(file("vendor/bin/pint")),
        GroupConfig::new(names::API_REFACTOR, Role::Api, "vendor/bin/rector process")
            .description("Apply Rector refactorings")
            .enabled_if(file("rector.php")),
        GroupConfig::new(
            names::API_ANALYSE,
            Role::Api,
            "vendor/bin/phpstan analyse --no-progress --memory-limit=1G",
        )
        .description("Static analysis with PHPStan")
        .enabled_if(file("phpstan.neon")),
        GroupConfig::new(names::API_TEST, Role::Api, "vendor/bin/pest --compact")
            .description("Run the Pest test suite")
            .enabled_if(file("vendor/bin/pest")),
        GroupConfig::new(names::FRONTEND_LINT, Role::Frontend, "npm run lint")
            .description("Run ESLint via the lint script")
            .enabled_if(npm_script("lint")),
        GroupConfig::new(names::FRONTEND_TEST, Role::Frontend, "npm test")
            .description("Run the frontend test script")
            .enabled_if(npm_script("test")),
    ]
}

fn file(path: &str) -> EnabledCondition {
    EnabledCondition {
        file_exists: Some(path.to_string()),
        ..Default::default()
    }
}

fn npm_script(script: &str) -> EnabledCondition {
    EnabledCondition {
        npm_script: Some(script.to_string()),
        command_exists: Some("npm".to_string()),
        ..Default::default()
    }
}
