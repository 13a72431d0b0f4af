//! CLI parsing, configuration layering and command tests.
//!
//! Commands run against the local simulator; nothing here talks to AWS.

// ============================================================================
// Clap argument parsing
// ============================================================================

mod clap_parsing {
    use clap::Parser;
    use qscript_cli::output::OutputFormat;
    use qscript_cli::{Cli, Commands};

    #[test]
    fn test_parse_vqa_minimal() {
        let cli = Cli::try_parse_from(["qscript", "vqa"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.format, OutputFormat::Text);
        match cli.command {
            Commands::Vqa(args) => {
                assert!(args.step_size.is_none());
                assert!(args.iterations.is_none());
                assert!(args.init.is_none());
                assert!(args.shots.is_none());
                assert!(args.gradient.is_none());
            }
            _ => panic!("Expected Vqa command"),
        }
    }

    #[test]
    fn test_parse_vqa_all_options() {
        let cli = Cli::try_parse_from([
            "qscript",
            "vqa",
            "--step-size",
            "0.2",
            "-i",
            "50",
            "--init",
            "0.1,-0.2",
            "-s",
            "2048",
            "-g",
            "finite-difference",
        ])
        .unwrap();
        match cli.command {
            Commands::Vqa(args) => {
                assert_eq!(args.step_size, Some(0.2));
                assert_eq!(args.iterations, Some(50));
                assert_eq!(args.init, Some(vec![0.1, -0.2]));
                assert_eq!(args.shots, Some(2048));
                assert_eq!(args.gradient.as_deref(), Some("finite-difference"));
            }
            _ => panic!("Expected Vqa command"),
        }
    }

    #[test]
    fn test_parse_sample() {
        let cli = Cli::try_parse_from(["qscript", "sample", "-s", "500", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Sample(args) => {
                assert_eq!(args.shots, Some(500));
                assert_eq!(args.seed, Some(7));
            }
            _ => panic!("Expected Sample command"),
        }
    }

    #[test]
    fn test_parse_tomography() {
        let cli = Cli::try_parse_from([
            "qscript",
            "tomography",
            "-d",
            "sv1",
            "-m",
            "state",
            "--local",
        ])
        .unwrap();
        match cli.command {
            Commands::Tomography(args) => {
                assert_eq!(args.device.as_deref(), Some("sv1"));
                assert_eq!(args.mode.as_deref(), Some("state"));
                assert!(args.shots.is_none());
                assert!(args.local);
            }
            _ => panic!("Expected Tomography command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["qscript", "sample", "-vv", "--format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["qscript", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_missing_subcommand_fails() {
        assert!(Cli::try_parse_from(["qscript"]).is_err());
    }

    #[test]
    fn test_non_numeric_shots_fails() {
        assert!(Cli::try_parse_from(["qscript", "sample", "-s", "many"]).is_err());
    }

    #[test]
    fn test_unknown_format_fails() {
        assert!(Cli::try_parse_from(["qscript", "vqa", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_vqa_init_help_explains_default() {
        use clap::CommandFactory;

        let cmd = Cli::command();
        let vqa = cmd.find_subcommand("vqa").unwrap();
        let init = vqa.get_arguments().find(|a| a.get_id() == "init").unwrap();
        let help = init.get_long_help().unwrap().to_string();
        assert!(help.contains("0.011,0.012"));
        assert!(help.contains("origin"));
    }
}

// ============================================================================
// Flag overrides on top of configuration
// ============================================================================

mod overrides {
    use clap::Parser;
    use qscript_cli::config::{ConfigError, QscriptConfig};
    use qscript_cli::{Cli, Commands};
    use qscript_tomography::TomographyMode;
    use qscript_vqa::GradientMethod;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_vqa_flags_override_settings() {
        let mut config = QscriptConfig::default();
        let Commands::Vqa(args) = parse(&[
            "qscript",
            "vqa",
            "--step-size",
            "0.1",
            "--init",
            "1.0,2.0",
            "-g",
            "finite-difference",
        ]) else {
            panic!("Expected Vqa command");
        };
        args.apply(&mut config.vqa).unwrap();

        assert_eq!(config.vqa.step_size, 0.1);
        assert_eq!(config.vqa.iterations, 100);
        assert_eq!(config.vqa.initial_params, vec![1.0, 2.0]);
        assert_eq!(config.vqa.gradient, GradientMethod::FiniteDifference);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_gradient_is_validation_error() {
        let mut config = QscriptConfig::default();
        let Commands::Vqa(args) = parse(&["qscript", "vqa", "-g", "adam"]) else {
            panic!("Expected Vqa command");
        };
        let err = args.apply(&mut config.vqa).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_wrong_parameter_count_fails_validation() {
        let mut config = QscriptConfig::default();
        let Commands::Vqa(args) = parse(&["qscript", "vqa", "--init", "0.5"]) else {
            panic!("Expected Vqa command");
        };
        args.apply(&mut config.vqa).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_shots_fails_validation() {
        let mut config = QscriptConfig::default();
        let Commands::Sample(args) = parse(&["qscript", "sample", "-s", "0"]) else {
            panic!("Expected Sample command");
        };
        args.apply(&mut config.sampling);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tomography_flags_override_settings() {
        let mut config = QscriptConfig::default();
        assert_eq!(config.tomography.mode, TomographyMode::Process);

        let Commands::Tomography(args) =
            parse(&["qscript", "tomography", "-m", "state", "-s", "250", "-d", "aspen-m-3"])
        else {
            panic!("Expected Tomography command");
        };
        args.apply(&mut config.tomography).unwrap();

        assert_eq!(config.tomography.mode, TomographyMode::State);
        assert_eq!(config.tomography.shots, 250);
        assert_eq!(config.tomography.device_arn, "aspen-m-3");
    }

    #[test]
    fn test_unknown_mode_is_validation_error() {
        let mut config = QscriptConfig::default();
        let Commands::Tomography(args) = parse(&["qscript", "tomography", "-m", "shadow"]) else {
            panic!("Expected Tomography command");
        };
        assert!(args.apply(&mut config.tomography).is_err());
    }
}

// ============================================================================
// Configuration files
// ============================================================================

mod config_files {
    use std::io::Write;

    use qscript_cli::config::{ConfigError, QscriptConfig};
    use qscript_tomography::TomographyMode;

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "vqa:\n  step_size: 0.25\n  shots: 4096\ntomography:\n  mode: state\n  shots: 500\nbraket:\n  s3_bucket: my-results\nlogging:\n  level: debug"
        )
        .unwrap();

        let config = QscriptConfig::from_file(file.path()).unwrap();
        assert_eq!(config.vqa.step_size, 0.25);
        assert_eq!(config.vqa.iterations, 100);
        assert_eq!(config.vqa.shots, Some(4096));
        assert_eq!(config.tomography.mode, TomographyMode::State);
        assert_eq!(config.tomography.shots, 500);
        assert_eq!(config.braket.s3_bucket.as_deref(), Some("my-results"));
        assert_eq!(config.braket.s3_prefix, "qscript-results");
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sampling:\n  shots: 200").unwrap();

        let config = QscriptConfig::from_file(file.path())
            .unwrap()
            .merge_env_from(|key| match key {
                "QSCRIPT_SAMPLE_SHOTS" => Some("300".to_string()),
                "QSCRIPT_TOMOGRAPHY_MODE" => Some("state".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.sampling.shots, 300);
        assert_eq!(config.tomography.mode, TomographyMode::State);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = QscriptConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "vqa: [this is not a mapping").unwrap();
        let err = QscriptConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_serializes_back_to_yaml() {
        let config = QscriptConfig::default();
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let back: QscriptConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}

// ============================================================================
// Commands on the local simulator
// ============================================================================

mod commands {
    use qscript_adapter_sim::{SimulatorBackend, Statevector};
    use qscript_cli::commands::{sample, tomography, vqa};
    use qscript_cli::config::{SamplingSettings, TomographySettings, VqaSettings};
    use qscript_hal::Backend;
    use qscript_ir::Circuit;
    use qscript_tomography::{TomographyMode, TomographyOutcome};

    #[tokio::test]
    async fn test_sample_counts_cover_all_shots() {
        let settings = SamplingSettings {
            shots: 1000,
            seed: Some(42),
        };
        let result = sample::sample(&settings).await.unwrap();

        assert_eq!(result.shots, 1000);
        assert_eq!(result.counts.total_shots(), 1000);
        let zeros = result.counts.get("0");
        let ones = result.counts.get("1");
        assert_eq!(zeros + ones, 1000);
        assert!(zeros > 400 && ones > 400, "0: {zeros}, 1: {ones}");
    }

    #[tokio::test]
    async fn test_sample_seed_is_reproducible() {
        let settings = SamplingSettings {
            shots: 200,
            seed: Some(3),
        };
        let a = sample::sample(&settings).await.unwrap();
        let b = sample::sample(&settings).await.unwrap();
        assert_eq!(a.counts.to_ordered(), b.counts.to_ordered());
    }

    #[tokio::test]
    async fn test_vqa_reaches_minimum() {
        let result = vqa::optimize(&VqaSettings::default(), false).await.unwrap();

        assert_eq!(result.iterations, 100);
        assert_eq!(result.history.len(), 101);
        assert!((result.cost + 1.0).abs() < 1e-3, "cost {}", result.cost);
    }

    #[tokio::test]
    async fn test_local_state_tomography_of_bell_pair() {
        let settings = TomographySettings {
            mode: TomographyMode::State,
            shots: 2000,
            ..TomographySettings::default()
        };
        let backend = SimulatorBackend::new().with_seed(5);
        let circuit = Circuit::bell_pair().unwrap();

        let outcome = tomography::reconstruct(&backend, &circuit, &settings, false)
            .await
            .unwrap();
        assert_eq!(outcome.jobs(), 9);
        assert!(matches!(outcome, TomographyOutcome::State(_)));

        let rho = outcome.matrix();
        assert_eq!(rho.num_qubits(), 2);
        assert!(rho.is_valid(1e-8));

        let ideal = Statevector::from_circuit(&circuit).unwrap();
        let fidelity = rho.fidelity_with_pure(ideal.amplitudes()).unwrap();
        assert!(fidelity > 0.95, "fidelity {fidelity}");
    }

    #[tokio::test]
    async fn test_local_flag_selects_simulator() {
        let backend = tomography::connect(
            &TomographySettings::default(),
            &Default::default(),
            true,
        )
        .await
        .unwrap();
        assert_eq!(backend.name(), "simulator");
    }
}
