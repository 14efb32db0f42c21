use keyhaven::{
    Address, AuthMachine, AuthStatus, FileKvStore, IdentityError, IdentityResult, Mnemonic,
};
use secrecy::SecretString;
use tempfile::TempDir;

const KNOWN_PHRASE: &str =
    "pioneer million sorry pipe cry garden private olive give apology inch foster";
const KNOWN_ADDRESS: &str = "0xebc936ea6729bc1b3f357c16245bde58af954981";

fn secret(password: &str) -> SecretString {
    SecretString::from(password.to_string())
}

#[test]
fn signup_unlock_reset_flow_survives_restart() -> IdentityResult<()> {
    let temp_dir = TempDir::new().expect("create temp dir");

    // Signup in a first "process".
    let mnemonic = Mnemonic::parse(KNOWN_PHRASE)?;
    {
        let store = FileKvStore::new(temp_dir.path())?;
        let mut auth = AuthMachine::new(store)?;
        assert_eq!(auth.init()?, AuthStatus::Unregistered);

        let address = auth.signup(&mnemonic, &secret("a sound password"), "Alice")?;
        assert_eq!(address.to_string(), KNOWN_ADDRESS);
        assert_eq!(auth.status(), AuthStatus::Unauthenticated);
    }

    // Restart: a fresh machine over the same directory picks the record up.
    let store = FileKvStore::new(temp_dir.path())?;
    let mut auth = AuthMachine::new(store)?;
    assert_eq!(auth.init()?, AuthStatus::Unauthenticated);
    assert_eq!(
        auth.session().address,
        Some(Address::parse(KNOWN_ADDRESS)?)
    );
    assert_eq!(auth.session().name.as_deref(), Some("Alice"));

    // Wrong password stays locked; right password authenticates.
    let err = auth.unlock(&secret("wrong password")).unwrap_err();
    assert_eq!(err, IdentityError::DecryptionFailed);
    assert_eq!(auth.status(), AuthStatus::Unauthenticated);
    assert!(auth.session().last_error.is_some());

    assert_eq!(
        auth.unlock(&secret("a sound password"))?,
        AuthStatus::Authenticated
    );
    assert_eq!(auth.session().last_error, None);

    // Reset wipes everything.
    auth.reset()?;
    assert_eq!(auth.init()?, AuthStatus::Unregistered);

    let store = FileKvStore::new(temp_dir.path())?;
    let mut fresh = AuthMachine::new(store)?;
    assert_eq!(fresh.init()?, AuthStatus::Unregistered);
    Ok(())
}

#[test]
fn persisted_envelope_has_documented_shape() -> IdentityResult<()> {
    let temp_dir = TempDir::new().expect("create temp dir");
    let store = FileKvStore::new(temp_dir.path())?;
    let mut auth = AuthMachine::new(store)?;

    let mnemonic = Mnemonic::generate()?;
    auth.signup(&mnemonic, &secret("a sound password"), "Alice")?;

    let raw = std::fs::read_to_string(temp_dir.path().join("account.json")).expect("record file");
    let envelope: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");

    assert_eq!(envelope["version"], "v1");
    let data = &envelope["data"];
    assert_eq!(data["nonce"].as_str().unwrap().len(), 48);
    assert_eq!(data["salt"].as_str().unwrap().len(), 32);
    assert_eq!(data["name"], "Alice");

    let address = data["address"].as_str().unwrap();
    assert!(address.starts_with("0x"));
    assert_eq!(address.len(), 42);
    assert_eq!(address, address.to_lowercase());

    // Ciphertext never contains the phrase.
    assert!(!raw.contains(mnemonic.phrase().as_str()));
    Ok(())
}

#[test]
fn corrupted_record_file_degrades_to_unregistered() -> IdentityResult<()> {
    let temp_dir = TempDir::new().expect("create temp dir");
    {
        let store = FileKvStore::new(temp_dir.path())?;
        let mut auth = AuthMachine::new(store)?;
        let mnemonic = Mnemonic::generate()?;
        auth.signup(&mnemonic, &secret("a sound password"), "Alice")?;
    }

    let record_path = temp_dir.path().join("account.json");
    std::fs::write(&record_path, b"{ not json at all").expect("overwrite record");

    let store = FileKvStore::new(temp_dir.path())?;
    let mut auth = AuthMachine::new(store)?;
    assert_eq!(auth.init()?, AuthStatus::Unregistered);
    assert!(!record_path.exists(), "stale record is discarded");
    Ok(())
}

#[test]
fn ciphertext_bit_flip_keeps_account_locked() -> IdentityResult<()> {
    let temp_dir = TempDir::new().expect("create temp dir");
    let password = "a sound password";
    {
        let store = FileKvStore::new(temp_dir.path())?;
        let mut auth = AuthMachine::new(store)?;
        let mnemonic = Mnemonic::generate()?;
        auth.signup(&mnemonic, &secret(password), "Alice")?;
    }

    // Flip one hex digit inside the stored ciphertext.
    let record_path = temp_dir.path().join("account.json");
    let raw = std::fs::read_to_string(&record_path).expect("record file");
    let mut envelope: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
    let ciphertext = envelope["data"]["mnemonic"].as_str().unwrap().to_string();
    let flipped: String = {
        let mut chars: Vec<char> = ciphertext.chars().collect();
        chars[0] = if chars[0] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    };
    envelope["data"]["mnemonic"] = serde_json::Value::String(flipped);
    std::fs::write(&record_path, envelope.to_string()).expect("rewrite record");

    let store = FileKvStore::new(temp_dir.path())?;
    let mut auth = AuthMachine::new(store)?;
    assert_eq!(auth.init()?, AuthStatus::Unauthenticated);

    let err = auth.unlock(&secret(password)).unwrap_err();
    assert_eq!(err, IdentityError::DecryptionFailed);
    assert_eq!(auth.status(), AuthStatus::Unauthenticated);
    Ok(())
}
