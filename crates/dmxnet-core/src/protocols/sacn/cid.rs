use md5::{Digest, Md5};
use uuid::Uuid;

/// Stable component identifier derived from the host name.
///
/// The MD5 digest of the host name is used verbatim as the 16 CID bytes, so a
/// host keeps the same CID across restarts without persisting anything.
pub fn default_cid() -> Uuid {
    cid_from_name(&host_name())
}

/// Host name of this machine, lossily converted to UTF-8.
pub fn host_name() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

pub fn cid_from_name(name: &str) -> Uuid {
    let digest = Md5::digest(name.as_bytes());
    Uuid::from_bytes(digest.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cid_is_md5_of_name() {
        let cid = cid_from_name("");
        assert_eq!(cid.simple().to_string(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn default_cid_is_stable() {
        assert_eq!(default_cid(), default_cid());
    }
}
