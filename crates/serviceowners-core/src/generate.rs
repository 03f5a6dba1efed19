//! Random SERVICEOWNERS generation for benchmarking and testing.
//!
//! Output is deterministic for a given seed. Generated rules always parse,
//! and the generated paths exercise the same directories and extensions so
//! that matching does real work.

use rand::prelude::*;
use rand::rngs::StdRng;

/// Configuration for generating SERVICEOWNERS files and changed paths.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Number of rule lines to generate.
    pub num_rules: usize,
    /// Number of comment lines to generate.
    pub num_comments: usize,
    /// Number of paths to generate.
    pub num_paths: usize,
    /// Seed for deterministic generation.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_rules: 100,
            num_comments: 20,
            num_paths: 500,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Creates a config with `num_rules` rules and proportional comments
    /// and paths.
    pub fn new(num_rules: usize) -> Self {
        Self {
            num_rules,
            num_comments: num_rules / 5,
            num_paths: num_rules * 5,
            ..Default::default()
        }
    }

    /// Small fixture (~10 rules).
    pub fn small() -> Self {
        Self::new(10)
    }

    /// Medium fixture (~100 rules).
    pub fn medium() -> Self {
        Self::new(100)
    }

    /// Large fixture (~1000 rules).
    pub fn large() -> Self {
        Self::new(1_000)
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of generated paths.
    pub fn with_paths(mut self, num_paths: usize) -> Self {
        self.num_paths = num_paths;
        self
    }
}

mod vocabulary {
    pub const PATTERN_TEMPLATES: &[&str] = &[
        "*.{ext}",
        "**/*.{ext}",
        "{dir}/",
        "{dir}/**",
        "/{dir}/*.{ext}",
        "apps/{dir}/",
        "apps/**/*.{ext}",
        "{dir}/**/test_*.{ext}",
        "docs/**/*.md",
        "libs/{dir}/[a-m]*",
    ];

    pub const EXTENSIONS: &[&str] = &["rs", "py", "js", "ts", "go", "md", "yaml", "json", "toml"];
    pub const DIRECTORIES: &[&str] = &[
        "api", "web", "billing", "search", "auth", "infra", "docs", "tools",
    ];
    pub const SERVICES: &[&str] = &[
        "api", "web", "billing", "search", "auth", "platform", "docs", "core",
    ];
    pub const SECTION_NAMES: &[&str] = &["Product", "Platform", "Infrastructure", "Documentation"];
    pub const FILE_STEMS: &[&str] = &["main", "lib", "handler", "test_handler", "config", "README"];
}

/// Probability of inserting a comment section header (percentage).
const COMMENT_PROBABILITY: u32 = 20;

/// Generates SERVICEOWNERS text.
pub fn generate(config: &GeneratorConfig) -> String {
    use vocabulary::*;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut out = String::from("# Auto-generated SERVICEOWNERS for benchmarking\n\n");
    let mut comments_added = 0;

    for rule in 0..config.num_rules {
        if comments_added < config.num_comments
            && rule > 0
            && rng.random_ratio(COMMENT_PROBABILITY, 100)
        {
            let section = SECTION_NAMES[rng.random_range(0..SECTION_NAMES.len())];
            out.push_str(&format!("\n# {} section\n", section));
            comments_added += 1;
        }

        let template = PATTERN_TEMPLATES[rng.random_range(0..PATTERN_TEMPLATES.len())];
        let ext = EXTENSIONS[rng.random_range(0..EXTENSIONS.len())];
        let dir = DIRECTORIES[rng.random_range(0..DIRECTORIES.len())];
        let service = SERVICES[rng.random_range(0..SERVICES.len())];
        let pattern = template.replace("{ext}", ext).replace("{dir}", dir);

        out.push_str(&format!("{:<32} {}\n", pattern, service));
    }

    out
}

/// Generates repository-relative paths in the generator's vocabulary.
pub fn generate_paths(config: &GeneratorConfig) -> Vec<String> {
    use vocabulary::*;

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    (0..config.num_paths)
        .map(|_| {
            let dir = DIRECTORIES[rng.random_range(0..DIRECTORIES.len())];
            let stem = FILE_STEMS[rng.random_range(0..FILE_STEMS.len())];
            let ext = EXTENSIONS[rng.random_range(0..EXTENSIONS.len())];
            match rng.random_range(0..4) {
                0 => format!("{}.{}", stem, ext),
                1 => format!("{}/{}.{}", dir, stem, ext),
                2 => format!("apps/{}/src/{}.{}", dir, stem, ext),
                _ => format!("libs/{}/nested/{}.{}", dir, stem, ext),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_rules;

    #[test]
    fn deterministic_for_seed() {
        let config = GeneratorConfig::small();
        assert_eq!(generate(&config), generate(&config));
        assert_eq!(generate_paths(&config), generate_paths(&config));
        assert_ne!(
            generate(&config),
            generate(&config.clone().with_seed(7))
        );
    }

    #[test]
    fn generated_rules_parse() {
        let config = GeneratorConfig::medium();
        let rules = parse_rules(&generate(&config), "generated").unwrap();
        assert_eq!(rules.len(), config.num_rules);
    }

    #[test]
    fn path_count() {
        let config = GeneratorConfig::small().with_paths(17);
        assert_eq!(generate_paths(&config).len(), 17);
    }
}
