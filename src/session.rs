use std::fs::File;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use ssh2::{OpenFlags, OpenType};

use crate::DeployError;
use crate::config::DeploySettings;

/// Capability to upload one local file to a remote path. The local path is
/// the literal source content to send, not something the remote side
/// resolves. Returns false on any failure and never panics or errors across
/// this boundary.
pub trait Uploader {
    fn put(&mut self, remote_path: &str, local_path: &Path) -> bool;
}

/// Factory opening one authenticated connection. Boxed as a trait object so
/// tests can inject fake transports.
pub trait Transport {
    fn connect(&self) -> Result<Box<dyn Uploader>, DeployError>;
}

fn create_tcp_connection(addr: &str) -> Result<TcpStream, DeployError> {
    let mut addrs =
        addr.to_socket_addrs().map_err(|_| DeployError::SshNoAddress(addr.to_string()))?;
    let sock = addrs.next().ok_or_else(|| DeployError::SshNoAddress(addr.to_string()))?;
    let tcp = TcpStream::connect_timeout(&sock, Duration::from_secs(10))
        .map_err(|e| DeployError::SshSessionCreateFailed(format!("{}: {}", addr, e)))?;
    let _ = tcp.set_read_timeout(Some(Duration::from_secs(30)));
    let _ = tcp.set_write_timeout(Some(Duration::from_secs(30)));
    Ok(tcp)
}

/// ssh2-backed transport: TCP connect, handshake, then a single password
/// authentication attempt. No fallback auth methods and no retry; the
/// session manager caches whatever outcome this produces.
pub struct SftpTransport {
    settings: DeploySettings,
}

impl SftpTransport {
    pub fn new(settings: DeploySettings) -> Self {
        Self { settings }
    }
}

impl Transport for SftpTransport {
    fn connect(&self) -> Result<Box<dyn Uploader>, DeployError> {
        let addr = self.settings.addr();
        let tcp = create_tcp_connection(&addr)?;
        let mut sess = ssh2::Session::new()
            .map_err(|_| DeployError::SshSessionCreateFailed(addr.clone()))?;
        sess.set_tcp_stream(tcp);
        sess.handshake().map_err(|_| DeployError::SshHandshakeFailed(addr.clone()))?;
        let login = sess.userauth_password(&self.settings.user, &self.settings.password);
        if login.is_err() || !sess.authenticated() {
            return Err(DeployError::SshAuthFailed(addr));
        }
        let sftp = sess.sftp().map_err(|e| DeployError::SftpCreateFailed(format!("{}", e)))?;
        Ok(Box::new(Ssh2Uploader { sftp }))
    }
}

// The ssh2::Sftp handle keeps its parent session alive internally, so it can
// be boxed on its own.
struct Ssh2Uploader {
    sftp: ssh2::Sftp,
}

impl Uploader for Ssh2Uploader {
    fn put(&mut self, remote_path: &str, local_path: &Path) -> bool {
        let mut local = match File::open(local_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!("cannot open local file {}: {}", local_path.display(), e);
                return false;
            }
        };
        let flags = OpenFlags::CREATE | OpenFlags::WRITE | OpenFlags::TRUNCATE;
        let mut remote =
            match self.sftp.open_mode(Path::new(remote_path), flags, 0o644, OpenType::File) {
                Ok(f) => f,
                Err(e) => {
                    tracing::debug!("cannot open remote file {}: {}", remote_path, e);
                    return false;
                }
            };
        match std::io::copy(&mut local, &mut remote) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("upload failed for {}: {}", remote_path, e);
                false
            }
        }
    }
}

/// Owns the single remote connection of one task instance. The first
/// `acquire` connects and authenticates; the outcome (session or failure)
/// is cached for the rest of the instance's lifetime, so at most one
/// authentication attempt is ever made. Never shared across task instances.
pub struct SessionManager {
    transport: Box<dyn Transport>,
    state: Option<Option<Box<dyn Uploader>>>,
}

impl SessionManager {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport, state: None }
    }

    /// The cached uploader, or None when session acquisition failed. A failed
    /// acquisition is re-signalled on every later call without reconnecting.
    pub fn acquire(&mut self) -> Option<&mut (dyn Uploader + '_)> {
        if self.state.is_none() {
            match self.transport.connect() {
                Ok(uploader) => self.state = Some(Some(uploader)),
                Err(e) => {
                    if e.is_auth_failure() {
                        tracing::debug!("not able to log in to SFTP: {}", e);
                    } else {
                        tracing::debug!("cannot reach SFTP server: {}", e);
                    }
                    self.state = Some(None);
                }
            }
        }
        match self.state.as_mut() {
            Some(Some(b)) => Some(b.as_mut()),
            _ => None,
        }
    }
}
