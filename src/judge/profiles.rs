//! Language profile registry
//!
//! Single source of truth for how each supported language is built and run.
//! No other module hard-codes images, filenames, or commands; adding a
//! language means adding a profile here.

use std::collections::HashMap;

use crate::constants::languages;

/// Immutable build/run recipe for one language
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    /// Container image the sandbox is created from
    pub image: &'static str,
    /// Canonical source filename inside /app
    pub filename: &'static str,
    /// Compile command, if the language needs one
    pub compile_command: Option<&'static str>,
    /// Run command (wrapped in `timeout` by the engine)
    pub run_command: &'static str,
    /// Environment overrides applied to the sandbox
    pub env: &'static [(&'static str, &'static str)],
}

impl LanguageProfile {
    /// Look up the profile for a language tag
    pub fn for_language(language: &str) -> Option<&'static LanguageProfile> {
        match language {
            languages::JAVA => Some(&JAVA),
            languages::PYTHON => Some(&PYTHON),
            languages::C => Some(&C),
            languages::CPP => Some(&CPP),
            languages::JAVASCRIPT => Some(&JAVASCRIPT),
            languages::CSHARP => Some(&CSHARP),
            _ => None,
        }
    }

    /// Environment overrides as an owned map
    pub fn env_map(&self) -> HashMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// True for languages whose compiled binary needs an executable bit
    pub fn needs_exec_bit(&self) -> bool {
        matches!(self.run_command, "/app/main")
    }
}

static JAVA: LanguageProfile = LanguageProfile {
    image: "eclipse-temurin:17-jdk",
    filename: "Main.java",
    compile_command: Some("javac -d /app Main.java"),
    run_command: "java -cp .:/app -XX:MaxRAM=256m Main",
    env: &[],
};

static PYTHON: LanguageProfile = LanguageProfile {
    image: "python:3.11-slim",
    filename: "app.py",
    compile_command: None,
    run_command: "python -B -E -S app.py",
    env: &[("PYTHONUNBUFFERED", "1")],
};

static C: LanguageProfile = LanguageProfile {
    image: "gcc:11",
    filename: "main.c",
    compile_command: Some("gcc -O2 -std=c11 -o /app/main main.c -lm"),
    run_command: "/app/main",
    env: &[],
};

static CPP: LanguageProfile = LanguageProfile {
    image: "gcc:11",
    filename: "main.cpp",
    compile_command: Some("g++ -O2 -std=c++17 -o /app/main main.cpp -lm"),
    run_command: "/app/main",
    env: &[],
};

static JAVASCRIPT: LanguageProfile = LanguageProfile {
    image: "node:18-slim",
    filename: "index.js",
    compile_command: None,
    run_command: "node --max-old-space-size=256 index.js",
    env: &[],
};

// The dotnet CLI has no single-file compile mode, so the compile command
// scaffolds a console project around the submitted source and builds it
// into /app/build.
static CSHARP: LanguageProfile = LanguageProfile {
    image: "mcr.microsoft.com/dotnet/sdk:7.0",
    filename: "Submission.cs",
    compile_command: Some(
        "mkdir -p /app/proj && cd /app/proj && \
         dotnet new console -n app -o . --force >/dev/null && \
         cp /app/Submission.cs Program.cs && \
         dotnet build -c Release -o /app/build --nologo -v q",
    ),
    run_command: "/app/build/app",
    env: &[
        ("DOTNET_CLI_TELEMETRY_OPTOUT", "1"),
        ("DOTNET_NOLOGO", "1"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_supported_languages_resolve() {
        for lang in languages::ALL {
            assert!(
                LanguageProfile::for_language(lang).is_some(),
                "missing profile for {lang}"
            );
        }
    }

    #[test]
    fn test_unknown_language_is_none() {
        assert!(LanguageProfile::for_language("ruby").is_none());
        assert!(LanguageProfile::for_language("").is_none());
    }

    #[test]
    fn test_interpreted_languages_skip_compile() {
        assert!(LanguageProfile::for_language("python").unwrap().compile_command.is_none());
        assert!(LanguageProfile::for_language("javascript").unwrap().compile_command.is_none());
        assert!(LanguageProfile::for_language("java").unwrap().compile_command.is_some());
        assert!(LanguageProfile::for_language("csharp").unwrap().compile_command.is_some());
    }

    #[test]
    fn test_canonical_filenames() {
        assert_eq!(LanguageProfile::for_language("java").unwrap().filename, "Main.java");
        assert_eq!(LanguageProfile::for_language("python").unwrap().filename, "app.py");
        assert_eq!(LanguageProfile::for_language("c").unwrap().filename, "main.c");
        assert_eq!(LanguageProfile::for_language("cpp").unwrap().filename, "main.cpp");
        assert_eq!(LanguageProfile::for_language("javascript").unwrap().filename, "index.js");
        assert_eq!(LanguageProfile::for_language("csharp").unwrap().filename, "Submission.cs");
    }

    #[test]
    fn test_native_binaries_need_exec_bit() {
        assert!(LanguageProfile::for_language("c").unwrap().needs_exec_bit());
        assert!(LanguageProfile::for_language("cpp").unwrap().needs_exec_bit());
        assert!(!LanguageProfile::for_language("python").unwrap().needs_exec_bit());
    }
}
