//! Connection registry: the bidirectional display name <-> connection binding.

use std::collections::HashMap;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use super::value_object::{ConnectionId, DisplayName};

/// Bidirectional binding between display names and live connections.
///
/// At any instant a name maps to at most one connection and a connection
/// carries at most one name. The last registration of a name wins.
#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    name_to_connection: HashMap<DisplayName, ConnectionId>,
    connection_to_name: HashMap<ConnectionId, DisplayName>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `connection_id`.
    ///
    /// Returns the connection that previously held `name`, if the name moved
    /// to a different connection. That connection is left unbound.
    pub fn register(
        &mut self,
        connection_id: ConnectionId,
        name: DisplayName,
    ) -> Option<ConnectionId> {
        // The connection drops its previous name, unless someone else took it over.
        if let Some(previous_name) = self.connection_to_name.get(&connection_id)
            && previous_name != &name
            && self.name_to_connection.get(previous_name) == Some(&connection_id)
        {
            let previous_name = previous_name.clone();
            self.name_to_connection.remove(&previous_name);
        }

        let evicted = self
            .name_to_connection
            .insert(name.clone(), connection_id.clone())
            .filter(|previous| previous != &connection_id);

        if let Some(evicted) = &evicted
            && self.connection_to_name.get(evicted) == Some(&name)
        {
            self.connection_to_name.remove(evicted);
        }

        self.connection_to_name.insert(connection_id, name);
        evicted
    }

    /// Remove whatever binding `connection_id` holds.
    ///
    /// Returns the name the connection was bound to.
    pub fn unregister(&mut self, connection_id: &ConnectionId) -> Option<DisplayName> {
        let name = self.connection_to_name.remove(connection_id)?;
        if self.name_to_connection.get(&name) == Some(connection_id) {
            self.name_to_connection.remove(&name);
        }
        Some(name)
    }

    pub fn lookup_connection(&self, name: &DisplayName) -> Option<&ConnectionId> {
        self.name_to_connection.get(name)
    }

    pub fn lookup_name(&self, connection_id: &ConnectionId) -> Option<&DisplayName> {
        self.connection_to_name.get(connection_id)
    }

    /// All registered names, ordered ignoring case and accents.
    ///
    /// Names that collate equal fall back to their raw ordering.
    pub fn list_active_names(&self) -> Vec<DisplayName> {
        self.active_bindings()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// `(name, connection)` pairs in the same order as `list_active_names`.
    pub fn active_bindings(&self) -> Vec<(DisplayName, ConnectionId)> {
        let mut bindings: Vec<(DisplayName, ConnectionId)> = self
            .name_to_connection
            .iter()
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect();
        bindings.sort_by_cached_key(|(name, _)| (collation_key(name), name.clone()));
        bindings
    }

    pub fn len(&self) -> usize {
        self.name_to_connection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_connection.is_empty()
    }
}

/// Lowercased base letters of `name`: "Émile" collates next to "emile".
fn collation_key(name: &DisplayName) -> String {
    name.as_str()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    fn assert_consistent(registry: &ConnectionRegistry) {
        for (bound_name, connection) in registry.active_bindings() {
            assert_eq!(registry.lookup_name(&connection), Some(&bound_name));
        }
        for (connection, bound_name) in &registry.connection_to_name {
            assert_eq!(registry.lookup_connection(bound_name), Some(connection));
        }
    }

    #[test]
    fn test_register_binds_both_directions() {
        // テスト項目: 登録すると名前と接続の双方向の対応が作られる
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();

        // when (操作):
        let evicted = registry.register(id("c1"), name("alice"));

        // then (期待する結果):
        assert_eq!(evicted, None);
        assert_eq!(registry.lookup_connection(&name("alice")), Some(&id("c1")));
        assert_eq!(registry.lookup_name(&id("c1")), Some(&name("alice")));
    }

    #[test]
    fn test_reregister_under_new_name_drops_stale_name() {
        // テスト項目: 同じ接続で別名を登録すると古い名前の対応が消える
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("alice"));

        // when (操作):
        registry.register(id("c1"), name("alicia"));

        // then (期待する結果):
        assert_eq!(registry.lookup_connection(&name("alice")), None);
        assert_eq!(registry.lookup_connection(&name("alicia")), Some(&id("c1")));
        assert_eq!(registry.list_active_names(), vec![name("alicia")]);
    }

    #[test]
    fn test_same_name_on_new_connection_evicts_old_connection() {
        // テスト項目: 同じ名前を別接続で登録すると古い接続の対応が外れる（最後の登録が勝つ）
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("alice"));

        // when (操作):
        let evicted = registry.register(id("c2"), name("alice"));

        // then (期待する結果):
        assert_eq!(evicted, Some(id("c1")));
        assert_eq!(registry.lookup_connection(&name("alice")), Some(&id("c2")));
        assert_eq!(registry.lookup_name(&id("c1")), None);
        assert_consistent(&registry);
    }

    #[test]
    fn test_evicted_connection_renaming_keeps_new_owner() {
        // テスト項目: 名前を奪われた接続が改名しても新しい所有者の対応は残る
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("alice"));
        registry.register(id("c2"), name("alice"));

        // when (操作):
        registry.register(id("c1"), name("carol"));

        // then (期待する結果):
        assert_eq!(registry.lookup_connection(&name("alice")), Some(&id("c2")));
        assert_eq!(registry.lookup_connection(&name("carol")), Some(&id("c1")));
        assert_consistent(&registry);
    }

    #[test]
    fn test_unregister_removes_both_directions() {
        // テスト項目: 切断時に双方向の対応が削除される
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("alice"));
        registry.register(id("c2"), name("bob"));

        // when (操作):
        let removed = registry.unregister(&id("c1"));

        // then (期待する結果):
        assert_eq!(removed, Some(name("alice")));
        assert_eq!(registry.lookup_connection(&name("alice")), None);
        assert_eq!(registry.lookup_name(&id("c1")), None);
        assert_eq!(registry.list_active_names(), vec![name("bob")]);
    }

    #[test]
    fn test_unregister_unknown_connection_is_noop() {
        // テスト項目: 未登録の接続を削除しても何も起きない
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("alice"));

        // when (操作):
        let removed = registry.unregister(&id("ghost"));

        // then (期待する結果):
        assert_eq!(removed, None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_active_names_is_case_insensitive() {
        // テスト項目: 名前一覧は大文字小文字を区別せずに並ぶ
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("charlie"));
        registry.register(id("c2"), name("Bob"));
        registry.register(id("c3"), name("alice"));

        // when (操作):
        let names = registry.list_active_names();

        // then (期待する結果):
        assert_eq!(names, vec![name("alice"), name("Bob"), name("charlie")]);
    }

    #[test]
    fn test_list_active_names_ignores_accents() {
        // テスト項目: アクセント付きの名前も基底文字の位置に並ぶ
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        for (index, display_name) in ["eve", "Émile", "zoe", "Ärne", "bob"].iter().enumerate() {
            registry.register(id(&format!("c{index}")), name(display_name));
        }

        // when (操作):
        let names = registry.list_active_names();

        // then (期待する結果):
        let expected: Vec<DisplayName> = ["Ärne", "bob", "Émile", "eve", "zoe"]
            .into_iter()
            .map(name)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_names_differing_only_by_accent_keep_stable_order() {
        // テスト項目: アクセントだけが違う名前同士は元の文字列順で並ぶ
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        registry.register(id("c1"), name("Émile"));
        registry.register(id("c2"), name("emile"));
        registry.register(id("c3"), name("Emile"));

        // when (操作):
        let names = registry.list_active_names();

        // then (期待する結果):
        assert_eq!(names, vec![name("Emile"), name("emile"), name("Émile")]);
    }

    #[test]
    fn test_lookup_round_trip_holds_over_register_sequence() {
        // テスト項目: 任意の登録列の後でも lookup_connection(lookup_name(c)) == c が成り立つ
        // given (前提条件):
        let mut registry = ConnectionRegistry::new();
        let steps = [
            ("c1", "alice"),
            ("c2", "bob"),
            ("c1", "bob"),
            ("c3", "alice"),
            ("c2", "dave"),
            ("c3", "carol"),
            ("c1", "carol"),
        ];

        for (connection, display_name) in steps {
            // when (操作):
            registry.register(id(connection), name(display_name));

            // then (期待する結果):
            assert_consistent(&registry);
        }
        assert_eq!(registry.lookup_connection(&name("carol")), Some(&id("c1")));
        assert_eq!(registry.lookup_name(&id("c3")), None);
    }
}
