/// 谓词抽象：判断 value 是否通过 filter key
///
/// ## 契约（重要）
/// - 必须是两个参数的纯函数：相同输入永远得到相同结果。
/// - 同一 `(value, filter)` 的结果在 value 插入后不得改变：filter entry 按 id
///   增量缓存结果，同一个 id 永远不会被重新测试。违反该前提不会报错，只会让缓存
///   永久返回过期结果。
pub trait FilterPredicate<V, F>: Send + Sync {
    fn test(&self, value: &V, filter: &F) -> bool;
}

impl<V, F, T> FilterPredicate<V, F> for T
where
    T: Fn(&V, &F) -> bool + Send + Sync,
{
    fn test(&self, value: &V, filter: &F) -> bool {
        self(value, filter)
    }
}
