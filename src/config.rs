use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::error::{config_error, Error};

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8010,
            max_connections: 5,
        }
    }
}

impl Config {
    /// Reads `DATABASE_URL`, `HOST`, `PORT` and `DB_MAX_CONNECTIONS`, after
    /// loading a `.env` file if one exists. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|name| env::var(name))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let defaults = Self::default();

        Ok(Self {
            database_url: read(&lookup, "DATABASE_URL", defaults.database_url)?,
            host: read(&lookup, "HOST", defaults.host)?,
            port: read(&lookup, "PORT", defaults.port)?,
            max_connections: read(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn read<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
{
    match lookup(name) {
        Ok(value) => value.trim().parse().map_err(|_| config_error(name, &value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err.into()),
    }
}

#[test]
fn defaults_apply_when_unset() {
    let config = Config::from_lookup(|_| Err(env::VarError::NotPresent)).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.addr(), "127.0.0.1:8010".parse::<SocketAddr>().unwrap());
}

#[test]
fn values_are_read_from_lookup() {
    let config = Config::from_lookup(|name| match name {
        "DATABASE_URL" => Ok("sqlite://rides.db".into()),
        "HOST" => Ok("0.0.0.0".into()),
        "PORT" => Ok("3000".into()),
        "DB_MAX_CONNECTIONS" => Ok("8".into()),
        _ => Err(env::VarError::NotPresent),
    })
    .unwrap();

    assert_eq!(config.database_url, "sqlite://rides.db");
    assert_eq!(config.addr(), "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
    assert_eq!(config.max_connections, 8);
}

#[test]
fn invalid_values_are_rejected() {
    let err = Config::from_lookup(|name| match name {
        "PORT" => Ok("eighty".into()),
        _ => Err(env::VarError::NotPresent),
    })
    .unwrap_err();

    assert_eq!(err.message, "invalid value \"eighty\" for PORT");
}
