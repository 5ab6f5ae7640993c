//! Who is posting, and under which name and role the post appears.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, debate::Debate, node::Role};

/// Display name used for posts by a judge.
pub const JUDGE_NAME: &str = "Judge";

/// Display name used for posts by a platform administrator.
pub const ADMIN_NAME: &str = "SYSTEM ADMIN";

/// A user's capacity on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Participant {
  Viewer,
  ProDebater,
  ConDebater,
  Judge,
  /// Speaks with judge authority.
  Admin,
}

impl Participant {
  pub fn can_post(self) -> bool { !matches!(self, Self::Viewer) }

  /// The role attached to this participant's posts, if they may post.
  pub fn role(self) -> Option<Role> {
    match self {
      Self::Viewer => None,
      Self::ProDebater => Some(Role::Pro),
      Self::ConDebater => Some(Role::Con),
      Self::Judge | Self::Admin => Some(Role::Judge),
    }
  }

  /// Author name and role for a post in `debate`.
  pub fn speaker(self, debate: &Debate) -> Result<(String, Role)> {
    let author = match self {
      Self::Viewer => return Err(Error::NotPermitted),
      Self::ProDebater => debate.pro_user.clone(),
      Self::ConDebater => debate.con_user.clone(),
      Self::Judge => JUDGE_NAME.to_owned(),
      Self::Admin => ADMIN_NAME.to_owned(),
    };
    let role = self.role().ok_or(Error::NotPermitted)?;
    Ok((author, role))
  }
}
