use clap::Parser;
use figment::Jail;
use xdupes::cli::Cli;
use xdupes::config::ConfigError;
use xdupes::scanner::{HashAlgorithm, ReadErrorPolicy};
use xdupes::{finder_config, resolve_config};

#[test]
fn test_resolve_config_flag_beats_file_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file("settings.toml", "threads = 6\nskip_empty = true\n")?;
        jail.set_env("XDUPES_THREADS", "4");

        let cli = Cli::try_parse_from(["xdupes", "--config", "settings.toml", "-t", "2", "src"])
            .unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.threads, 2);
        assert!(config.skip_empty);
        Ok(())
    });
}

#[test]
fn test_resolve_config_env_without_flag() {
    Jail::expect_with(|jail| {
        jail.create_file("settings.toml", "threads = 6\n")?;
        jail.set_env("XDUPES_THREADS", "4");
        jail.set_env("XDUPES_HASH", "blake3");

        let cli = Cli::try_parse_from(["xdupes", "--config", "settings.toml", "src"]).unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.threads, 4);
        assert_eq!(config.hash, HashAlgorithm::Blake3);
        Ok(())
    });
}

#[test]
fn test_resolve_config_rejects_bad_threads() {
    Jail::expect_with(|jail| {
        jail.create_file("empty.toml", "")?;
        for bad in ["abc", "-1", "1.5", " 2"] {
            let cli = Cli::try_parse_from(["xdupes", "--config", "empty.toml", "-t", bad, "src"])
                .unwrap();
            assert!(matches!(
                resolve_config(&cli),
                Err(ConfigError::InvalidThreads(_))
            ));
        }
        Ok(())
    });
}

#[test]
fn test_resolve_config_missing_explicit_file_is_error() {
    Jail::expect_with(|_| {
        let cli = Cli::try_parse_from(["xdupes", "--config", "absent.toml", "src"]).unwrap();
        assert!(matches!(resolve_config(&cli), Err(ConfigError::NotFound(_))));
        Ok(())
    });
}

#[test]
fn test_finder_config_reflects_settings() {
    Jail::expect_with(|jail| {
        jail.create_file("empty.toml", "")?;
        let cli = Cli::try_parse_from([
            "xdupes",
            "--config",
            "empty.toml",
            "-r",
            "-t",
            "3",
            "--noempty",
            "--hash-unreadable",
            "--paranoid",
            "src",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        let finder = finder_config(&config);

        assert_eq!(finder.threads, 3);
        assert!(finder.walker_config.recursive);
        assert!(finder.skip_empty);
        assert!(finder.paranoid);
        assert_eq!(finder.read_error_policy, ReadErrorPolicy::HashPartial);
        Ok(())
    });
}
