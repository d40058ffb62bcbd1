//! Single-line text inputs and the two forms built from them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ─── TextField ────────────────────────────────────────────────────────────────

/// An editable single-line value. Masked fields render as bullets.
#[derive(Debug, Clone, Default)]
pub struct TextField {
  pub value:  String,
  pub masked: bool,
}

impl TextField {
  pub fn masked() -> Self { Self { value: String::new(), masked: true } }

  /// Apply an editing key. Returns `true` if the key was consumed.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
      return false;
    }
    match key.code {
      KeyCode::Char(c) => {
        self.value.push(c);
        true
      }
      KeyCode::Backspace => {
        self.value.pop();
        true
      }
      _ => false,
    }
  }

  /// Text to draw, with masking applied.
  pub fn display(&self) -> String {
    if self.masked {
      "•".repeat(self.value.chars().count())
    } else {
      self.value.clone()
    }
  }

  pub fn is_blank(&self) -> bool { self.value.trim().is_empty() }

  pub fn clear(&mut self) { self.value.clear(); }
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
  #[default]
  SignIn,
  SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
  #[default]
  Email,
  Password,
}

/// State of the sign-in / sign-up form.
#[derive(Debug, Default)]
pub struct LoginForm {
  pub email:    TextField,
  pub password: TextField,
  pub focus:    LoginField,
  pub mode:     AuthMode,
  /// Failure from the last attempt.
  pub error:    Option<String>,
  /// Non-error feedback, e.g. a pending email confirmation.
  pub notice:   Option<String>,
}

impl LoginForm {
  pub fn new(email: String) -> Self {
    let focus = if email.is_empty() { LoginField::Email } else { LoginField::Password };
    Self {
      email: TextField { value: email, masked: false },
      password: TextField::masked(),
      focus,
      ..Self::default()
    }
  }

  pub fn focused_mut(&mut self) -> &mut TextField {
    match self.focus {
      LoginField::Email => &mut self.email,
      LoginField::Password => &mut self.password,
    }
  }

  pub fn next_field(&mut self) {
    self.focus = match self.focus {
      LoginField::Email => LoginField::Password,
      LoginField::Password => LoginField::Email,
    };
  }

  pub fn toggle_mode(&mut self) {
    self.mode = match self.mode {
      AuthMode::SignIn => AuthMode::SignUp,
      AuthMode::SignUp => AuthMode::SignIn,
    };
    self.error = None;
    self.notice = None;
  }

  /// Forget the password and any feedback; keeps the email for next time.
  pub fn reset(&mut self) {
    self.password.clear();
    self.error = None;
    self.notice = None;
    self.focus = if self.email.is_blank() { LoginField::Email } else { LoginField::Password };
  }
}

// ─── Ask question ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AskField {
  #[default]
  Title,
  Content,
}

/// State of the "Ask a Question" dialog.
#[derive(Debug, Default)]
pub struct AskForm {
  pub title:   TextField,
  pub content: TextField,
  pub focus:   AskField,
  pub error:   Option<String>,
}

impl AskForm {
  pub fn focused_mut(&mut self) -> &mut TextField {
    match self.focus {
      AskField::Title => &mut self.title,
      AskField::Content => &mut self.content,
    }
  }

  pub fn next_field(&mut self) {
    self.focus = match self.focus {
      AskField::Title => AskField::Content,
      AskField::Content => AskField::Title,
    };
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  #[test]
  fn field_edits_and_masks() {
    let mut f = TextField::masked();
    for c in "pw1".chars() {
      assert!(f.handle_key(key(KeyCode::Char(c))));
    }
    assert_eq!(f.value, "pw1");
    assert_eq!(f.display(), "•••");
    assert!(f.handle_key(key(KeyCode::Backspace)));
    assert_eq!(f.value, "pw");
    assert!(!f.handle_key(key(KeyCode::Enter)));
  }

  #[test]
  fn control_chords_are_not_text() {
    let mut f = TextField::default();
    assert!(!f.handle_key(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL)));
    assert!(f.value.is_empty());
  }

  #[test]
  fn prefilled_email_focuses_password() {
    let form = LoginForm::new("ada@example.com".into());
    assert_eq!(form.focus, LoginField::Password);
    assert_eq!(LoginForm::new(String::new()).focus, LoginField::Email);
  }

  #[test]
  fn toggling_mode_clears_feedback() {
    let mut form = LoginForm::default();
    form.error = Some("bad".into());
    form.toggle_mode();
    assert_eq!(form.mode, AuthMode::SignUp);
    assert!(form.error.is_none());
  }
}
