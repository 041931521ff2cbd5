//! Account provisioning: split the environment's identity pool into one
//! deployer plus a remainder pool.

use crate::environment::Environment;
use crate::error::EnvironmentError;
use crate::types::Identity;

/// The provisioned signers for one suite.
///
/// Built once in the suite's setup hook and never mutated afterwards: the
/// first identity the environment exposes becomes `deployer`, the remainder
/// (in environment order) becomes `accounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSet {
    /// Identity used to deploy contracts.
    pub deployer: Identity,
    /// Remaining identities, in the order the environment returned them.
    pub accounts: Vec<Identity>,
}

/// Partition the environment's identity pool into an [`AccountSet`].
///
/// Read-only with respect to the environment. Fails with
/// [`EnvironmentError::NoIdentities`] when the pool is empty, which aborts
/// the run: nothing can be deployed without a deployer.
pub async fn provision_accounts<E>(env: &E) -> Result<AccountSet, EnvironmentError>
where
    E: Environment + ?Sized,
{
    let mut identities = env.identities().await?;
    if identities.is_empty() {
        return Err(EnvironmentError::NoIdentities);
    }
    let deployer = identities.remove(0);
    Ok(AccountSet {
        deployer,
        accounts: identities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestoreError;
    use crate::types::{Address, SnapshotToken, ADDRESS_LEN};
    use async_trait::async_trait;

    struct PoolEnv {
        pool: Vec<Identity>,
    }

    #[async_trait]
    impl Environment for PoolEnv {
        async fn identities(&self) -> Result<Vec<Identity>, EnvironmentError> {
            Ok(self.pool.clone())
        }

        async fn checkpoint(&self) -> Result<SnapshotToken, EnvironmentError> {
            Ok(SnapshotToken::new(0))
        }

        async fn restore(&self, _token: SnapshotToken) -> Result<(), RestoreError> {
            Ok(())
        }
    }

    fn ident(tag: u8) -> Identity {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes[0] = tag;
        Identity::new(Address::new(bytes))
    }

    #[tokio::test]
    async fn five_identities_split_first_versus_rest() {
        let pool: Vec<_> = [1u8, 2, 3, 4, 5].iter().map(|t| ident(*t)).collect();
        let env = PoolEnv { pool: pool.clone() };

        let set = provision_accounts(&env).await.unwrap();
        assert_eq!(set.deployer, pool[0]);
        assert_eq!(set.accounts, pool[1..]);
    }

    #[tokio::test]
    async fn single_identity_yields_empty_pool() {
        let env = PoolEnv { pool: vec![ident(9)] };
        let set = provision_accounts(&env).await.unwrap();
        assert_eq!(set.deployer, ident(9));
        assert!(set.accounts.is_empty());
    }

    #[tokio::test]
    async fn empty_environment_is_fatal() {
        let env = PoolEnv { pool: vec![] };
        let err = provision_accounts(&env).await.unwrap_err();
        assert!(matches!(err, EnvironmentError::NoIdentities));
    }
}
