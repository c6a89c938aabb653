use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoSessionError {
    RemoteRequest(String),
    RemoteResponse(String),
    DatabaseOpen(String),
    DatabaseLookup(String),
    InvalidIp(String),
    NotFound(String),
    LookupExhausted(String),
    Config(String),
}

impl GeoSessionError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeoSessionError::RemoteRequest(_) => "E001",
            GeoSessionError::RemoteResponse(_) => "E002",
            GeoSessionError::DatabaseOpen(_) => "E003",
            GeoSessionError::DatabaseLookup(_) => "E004",
            GeoSessionError::InvalidIp(_) => "E005",
            GeoSessionError::NotFound(_) => "E006",
            GeoSessionError::LookupExhausted(_) => "E007",
            GeoSessionError::Config(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoSessionError::RemoteRequest(_) => "Remote Request Error",
            GeoSessionError::RemoteResponse(_) => "Remote Response Error",
            GeoSessionError::DatabaseOpen(_) => "Database Open Error",
            GeoSessionError::DatabaseLookup(_) => "Database Lookup Error",
            GeoSessionError::InvalidIp(_) => "Invalid IP Address",
            GeoSessionError::NotFound(_) => "Location Not Found",
            GeoSessionError::LookupExhausted(_) => "All Lookups Failed",
            GeoSessionError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeoSessionError::RemoteRequest(msg) => msg,
            GeoSessionError::RemoteResponse(msg) => msg,
            GeoSessionError::DatabaseOpen(msg) => msg,
            GeoSessionError::DatabaseLookup(msg) => msg,
            GeoSessionError::InvalidIp(msg) => msg,
            GeoSessionError::NotFound(msg) => msg,
            GeoSessionError::LookupExhausted(msg) => msg,
            GeoSessionError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 CLI lookup）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeoSessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeoSessionError {}

// 便捷的构造函数
impl GeoSessionError {
    pub fn remote_request<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::RemoteRequest(msg.into())
    }

    pub fn remote_response<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::RemoteResponse(msg.into())
    }

    pub fn database_open<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::DatabaseOpen(msg.into())
    }

    pub fn database_lookup<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::DatabaseLookup(msg.into())
    }

    pub fn invalid_ip<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::InvalidIp(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::NotFound(msg.into())
    }

    pub fn lookup_exhausted<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::LookupExhausted(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeoSessionError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<ureq::Error> for GeoSessionError {
    fn from(err: ureq::Error) -> Self {
        GeoSessionError::RemoteRequest(err.to_string())
    }
}

impl From<serde_json::Error> for GeoSessionError {
    fn from(err: serde_json::Error) -> Self {
        GeoSessionError::RemoteResponse(err.to_string())
    }
}

impl From<maxminddb::MaxMindDbError> for GeoSessionError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        GeoSessionError::DatabaseLookup(err.to_string())
    }
}

impl From<std::net::AddrParseError> for GeoSessionError {
    fn from(err: std::net::AddrParseError) -> Self {
        GeoSessionError::InvalidIp(err.to_string())
    }
}

impl From<std::io::Error> for GeoSessionError {
    fn from(err: std::io::Error) -> Self {
        GeoSessionError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeoSessionError>;
