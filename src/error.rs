/// Structured errors for session establishment and transfer orchestration.
///
/// Per-file upload failures never appear here: the uploader capability
/// reports them as `false` and the engine defers the file to a later
/// invocation.
#[derive(Debug, Clone)]
pub enum DeployError {
    SshNoAddress(String),
    SshSessionCreateFailed(String),
    SshHandshakeFailed(String),
    SshAuthFailed(String),
    SftpCreateFailed(String),
}

impl std::fmt::Display for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use DeployError::*;
        match self {
            SshNoAddress(addr) => write!(f, "cannot resolve address: {}", addr),
            SshSessionCreateFailed(addr) => write!(f, "cannot create SSH session: {}", addr),
            SshHandshakeFailed(addr) => write!(f, "SSH handshake failed: {}", addr),
            SshAuthFailed(addr) => write!(f, "SFTP login failed: {}", addr),
            SftpCreateFailed(msg) => write!(f, "SFTP channel creation failed: {}", msg),
        }
    }
}

impl std::error::Error for DeployError {}

impl DeployError {
    /// Whether this failure happened at the authentication step rather than
    /// while reaching the server. Both are terminal for a run; the log line
    /// differs.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, DeployError::SshAuthFailed(_))
    }
}
