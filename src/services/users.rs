// Author: Dustin Pilgrim
// License: MIT

use nix::unistd::{Uid, User};

use crate::core::error::Error;
use crate::core::sources::UserDirectory;

/// Resolves uids through the system user database.
pub struct NssUserDirectory;

impl UserDirectory for NssUserDirectory {
    fn uid_to_name(&self, uid: u32) -> Result<String, Error> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(Some(user)) => Ok(user.name),
            Ok(None) => Err(Error::UserLookup(format!("uid {uid} is unknown"))),
            Err(err) => Err(Error::UserLookup(format!("uid {uid}: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_zero_is_root() {
        assert_eq!(NssUserDirectory.uid_to_name(0).unwrap(), "root");
    }
}
