//! Redis-backed cache store.

use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, Script, aio::ConnectionManager};

use super::store::{CacheError, CacheStore};

// Runs server-side, so concurrent prepends on one key serialize inside Redis.
// cjson decodes objects and arrays to tables alike; only dense 1..n keys count as a list.
const PREPEND_SCRIPT: &str = r#"
local function is_list(value)
  if type(value) ~= 'table' then
    return false
  end
  local len = #value
  for k, _ in pairs(value) do
    if type(k) ~= 'number' or k < 1 or k > len or k % 1 ~= 0 then
      return false
    end
  end
  return true
end

local current = redis.call('GET', KEYS[1])
local list = {}
if current then
  list = cjson.decode(current)
  if not is_list(list) then
    return redis.error_reply('NOTALIST')
  end
end
table.insert(list, 1, cjson.decode(ARGV[1]))
redis.call('SET', KEYS[1], cjson.encode(list))
return #list
"#;

/// Cache store shared through a Redis server.
#[derive(Clone)]
pub struct RedisCacheStore {
    manager: ConnectionManager,
    prepend: Script,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;

        Ok(Self {
            manager,
            prepend: Script::new(PREPEND_SCRIPT),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(CacheError::backend)?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set(key, &value[..])
            .await
            .map_err(CacheError::backend)?;
        Ok(())
    }

    async fn contains(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.manager.clone();
        let exists: bool = conn.exists(key).await.map_err(CacheError::backend)?;
        Ok(exists)
    }

    async fn prepend(&self, key: &str, element: Bytes) -> Result<usize, CacheError> {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<usize> = self
            .prepend
            .key(key)
            .arg(&element[..])
            .invoke_async(&mut conn)
            .await;

        match result {
            Ok(len) => Ok(len),
            Err(err) if is_not_a_list(&err) => Err(CacheError::NotAList {
                key: key.to_string(),
            }),
            Err(err) => Err(CacheError::backend(err)),
        }
    }
}

fn is_not_a_list(err: &redis::RedisError) -> bool {
    err.code() == Some("NOTALIST") || err.to_string().contains("NOTALIST")
}
