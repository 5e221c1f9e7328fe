//! CLI Command Tests
//!
//! Argument parsing, command setup and JSON output shape.

// =============================================================================
// CLI Argument Parsing Tests
// =============================================================================

mod cli_parsing {
    use clap::Parser;
    use cinegraph::cli::{Cli, Command, RegionAction};

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from::<_, &str>([]);
        assert!(!cli.is_cli_mode());
        assert!(cli.region.is_none());
    }

    #[test]
    fn test_search_command_basic() {
        let cli = Cli::parse_from(["cinegraph", "search", "blade runner"]);
        assert!(cli.is_cli_mode());
        match cli.command {
            Some(Command::Search(cmd)) => {
                assert_eq!(cmd.query, "blade runner");
                assert_eq!(cmd.limit, 10);
            }
            _ => panic!("Expected Search command"),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["cinegraph", "search"]).is_err());
    }

    #[test]
    fn test_trending_default_limit() {
        let cli = Cli::parse_from(["cinegraph", "trending"]);
        match cli.command {
            Some(Command::Trending(cmd)) => assert_eq!(cmd.limit, 12),
            _ => panic!("Expected Trending command"),
        }
    }

    #[test]
    fn test_info_with_global_region_and_json() {
        let cli = Cli::parse_from(["cinegraph", "info", "78", "--region", "GB", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.region.as_deref(), Some("GB"));
        match cli.command {
            Some(Command::Info(cmd)) => assert_eq!(cmd.id, 78),
            _ => panic!("Expected Info command"),
        }
    }

    #[test]
    fn test_info_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["cinegraph", "info", "blade"]).is_err());
    }

    #[test]
    fn test_streaming_short_region_flag() {
        let cli = Cli::parse_from(["cinegraph", "-r", "in", "streaming", "550"]);
        assert_eq!(cli.region.as_deref(), Some("in"));
        assert!(matches!(cli.command, Some(Command::Streaming(cmd)) if cmd.id == 550));
    }

    #[test]
    fn test_recommend_with_limit() {
        let cli = Cli::parse_from(["cinegraph", "recommend", "78", "-l", "3"]);
        match cli.command {
            Some(Command::Recommend(cmd)) => {
                assert_eq!(cmd.id, 78);
                assert_eq!(cmd.limit, 3);
            }
            _ => panic!("Expected Recommend command"),
        }
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::parse_from(["cinegraph", "s", "heat"]);
        assert!(matches!(cli.command, Some(Command::Search(_))));

        let cli = Cli::parse_from(["cinegraph", "i", "949"]);
        assert!(matches!(cli.command, Some(Command::Info(_))));

        let cli = Cli::parse_from(["cinegraph", "w", "949"]);
        assert!(matches!(cli.command, Some(Command::Streaming(_))));

        let cli = Cli::parse_from(["cinegraph", "rec", "949"]);
        assert!(matches!(cli.command, Some(Command::Recommend(_))));
    }

    #[test]
    fn test_region_actions() {
        let cli = Cli::parse_from(["cinegraph", "region", "set", "GB"]);
        match cli.command {
            Some(Command::Region(cmd)) => {
                assert_eq!(cmd.action, RegionAction::Set { code: "GB".into() })
            }
            _ => panic!("Expected Region command"),
        }

        for (arg, expected) in [
            ("get", RegionAction::Get),
            ("list", RegionAction::List),
            ("detect", RegionAction::Detect),
        ] {
            let cli = Cli::parse_from(["cinegraph", "region", arg]);
            match cli.command {
                Some(Command::Region(cmd)) => assert_eq!(cmd.action, expected),
                _ => panic!("Expected Region command"),
            }
        }
    }

    #[test]
    fn test_region_requires_action() {
        assert!(Cli::try_parse_from(["cinegraph", "region"]).is_err());
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["cinegraph", "--config", "/tmp/cg.toml", "trending"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/cg.toml")));
    }
}

// =============================================================================
// Command Setup Tests
// =============================================================================

mod command_setup {
    use cinegraph::api::{ErrorInfo, ErrorKind};
    use cinegraph::cli::ExitCode;
    use cinegraph::commands::{exit_code_for, open_session, region_store};
    use cinegraph::config::Config;
    use cinegraph::models::Region;

    #[test]
    fn test_region_override_is_in_memory() {
        let store = region_store(Some(Region::GB));
        assert_eq!(store.get(), Region::GB);
        assert!(store.has_persisted());
    }

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let info = |kind| ErrorInfo {
            kind,
            message: String::new(),
        };
        assert_eq!(exit_code_for(&info(ErrorKind::NotFound)), ExitCode::NotFound);
        assert_eq!(exit_code_for(&info(ErrorKind::Network)), ExitCode::NetworkError);
        assert_eq!(exit_code_for(&info(ErrorKind::Unauthorized)), ExitCode::Error);
    }

    #[tokio::test]
    async fn test_open_session_with_backend() {
        let config = Config {
            backend_url: Some("http://localhost:8001".into()),
            ..Config::default()
        };
        let session = open_session(&config, region_store(Some(Region::IN))).unwrap();
        assert_eq!(session.region(), Region::IN);
        assert!(!session.is_busy());
    }
}

// =============================================================================
// JSON Output Tests
// =============================================================================

mod json_output {
    use cinegraph::cli::{ExitCode, JsonOutput, RegionEntry};
    use cinegraph::models::Region;

    #[test]
    fn test_success_envelope() {
        let output = JsonOutput::success(RegionEntry::from(Region::GB));
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["data"]["code"], "GB");
        assert_eq!(value["data"]["name"], "United Kingdom");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_envelope() {
        let output = JsonOutput::<()>::error_msg("Resource not found (404)", ExitCode::NotFound);
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["error"], "Resource not found (404)");
        assert_eq!(value["exit_code"], 4);
        assert!(value.get("data").is_none());
    }
}
